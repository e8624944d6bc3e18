// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller identity resolution. The core never
//! authenticates — authentication, TLS, and the HTTP framework itself are
//! explicitly out of scope (§1) — it only reads the `user_id` an upstream
//! authenticator already resolved. `AuthMode` merely selects which
//! header/claim shape that upstream left behind, following the same
//! `validate_bearer`-style header inspection `transport::auth` used in the
//! teacher, now producing an identity instead of a pass/fail.

use axum::http::HeaderMap;

use crate::config::AuthMode;
use crate::error::PlaneFailure;

/// Resolve the caller's `user_id` for the configured `AuthMode`.
///
/// - `Dev`: reads `X-Dev-User-Id` literally; defaults to `"dev-user"` when
///   absent, since dev mode exists precisely so a local client doesn't need
///   a real identity provider in front of it.
/// - `Jwt`: reads the unverified payload segment of a `Bearer` JWT in
///   `Authorization` (signature verification is the upstream authenticator's
///   job per §1) and selects a claim in the documented order `user_id > sub
///   > uid`.
/// - `ApiKey`: reads `X-Api-Key` and treats its value as the already-resolved
///   user id (the key-to-identity mapping lives in the external
///   authenticator, out of scope here).
pub fn resolve_user_id(headers: &HeaderMap, mode: AuthMode) -> Result<String, PlaneFailure> {
    match mode {
        AuthMode::Dev => Ok(header_str(headers, "x-dev-user-id").unwrap_or("dev-user").to_owned()),
        AuthMode::ApiKey => header_str(headers, "x-api-key")
            .map(str::to_owned)
            .ok_or_else(|| PlaneFailure::new(crate::error::PlaneError::Auth, "missing X-Api-Key")),
        AuthMode::Jwt => {
            let bearer = header_str(headers, "authorization")
                .and_then(|h| h.strip_prefix("Bearer "))
                .ok_or_else(|| {
                    PlaneFailure::new(crate::error::PlaneError::Auth, "missing bearer token")
                })?;
            claim_from_jwt(bearer)
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Extracts `user_id`, falling back to `sub`, then `uid`, from the
/// unverified JWT payload segment. Malformed tokens are an `auth` failure.
fn claim_from_jwt(token: &str) -> Result<String, PlaneFailure> {
    let payload_b64 = token
        .split('.')
        .nth(1)
        .ok_or_else(|| PlaneFailure::new(crate::error::PlaneError::Auth, "malformed jwt"))?;

    let payload = base64_url_decode(payload_b64)
        .ok_or_else(|| PlaneFailure::new(crate::error::PlaneError::Auth, "malformed jwt payload"))?;

    let claims: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|_| PlaneFailure::new(crate::error::PlaneError::Auth, "malformed jwt claims"))?;

    for claim in ["user_id", "sub", "uid"] {
        if let Some(value) = claims.get(claim).and_then(|v| v.as_str()) {
            return Ok(value.to_owned());
        }
    }

    Err(PlaneFailure::new(crate::error::PlaneError::Auth, "no recognized identity claim"))
}

/// Minimal base64url (no padding) decoder — the JWT payload segment uses
/// this alphabet. Intentionally hand-rolled rather than pulling in a base64
/// crate for a single unverified-decode call in a collaborator shim.
fn base64_url_decode(input: &str) -> Option<Vec<u8>> {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
    let mut table = [255u8; 256];
    for (i, &c) in ALPHABET.iter().enumerate() {
        table[c as usize] = i as u8;
    }

    let mut bits: u32 = 0;
    let mut nbits = 0u32;
    let mut out = Vec::with_capacity(input.len() * 3 / 4);
    for c in input.bytes() {
        let v = table[c as usize];
        if v == 255 {
            continue;
        }
        bits = (bits << 6) | v as u32;
        nbits += 6;
        if nbits >= 8 {
            nbits -= 8;
            out.push((bits >> nbits) as u8);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for (k, v) in pairs {
            h.insert(axum::http::HeaderName::try_from(*k).unwrap(), v.parse().unwrap());
        }
        h
    }

    #[test]
    fn dev_mode_defaults_when_header_absent() {
        let resolved = resolve_user_id(&headers(&[]), AuthMode::Dev).unwrap();
        assert_eq!(resolved, "dev-user");
    }

    #[test]
    fn dev_mode_honors_explicit_header() {
        let resolved =
            resolve_user_id(&headers(&[("x-dev-user-id", "alice")]), AuthMode::Dev).unwrap();
        assert_eq!(resolved, "alice");
    }

    #[test]
    fn api_key_mode_requires_header() {
        assert!(resolve_user_id(&headers(&[]), AuthMode::ApiKey).is_err());
    }

    #[test]
    fn api_key_mode_reads_header_verbatim() {
        let resolved =
            resolve_user_id(&headers(&[("x-api-key", "key-123")]), AuthMode::ApiKey).unwrap();
        assert_eq!(resolved, "key-123");
    }

    fn fake_jwt(claims: serde_json::Value) -> String {
        fn b64(bytes: &[u8]) -> String {
            const ALPHABET: &[u8] =
                b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
            let mut out = String::new();
            for chunk in bytes.chunks(3) {
                let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
                let n = ((b[0] as u32) << 16) | ((b[1] as u32) << 8) | b[2] as u32;
                out.push(ALPHABET[((n >> 18) & 63) as usize] as char);
                out.push(ALPHABET[((n >> 12) & 63) as usize] as char);
                if chunk.len() > 1 {
                    out.push(ALPHABET[((n >> 6) & 63) as usize] as char);
                }
                if chunk.len() > 2 {
                    out.push(ALPHABET[(n & 63) as usize] as char);
                }
            }
            out
        }
        format!("{}.{}.{}", b64(b"{}"), b64(claims.to_string().as_bytes()), b64(b"sig"))
    }

    #[test]
    fn jwt_mode_prefers_user_id_over_sub_and_uid() {
        let token = fake_jwt(serde_json::json!({"user_id": "u1", "sub": "s1", "uid": "x1"}));
        let header = format!("Bearer {token}");
        let resolved =
            resolve_user_id(&headers(&[("authorization", &header)]), AuthMode::Jwt).unwrap();
        assert_eq!(resolved, "u1");
    }

    #[test]
    fn jwt_mode_falls_back_to_sub_then_uid() {
        let token = fake_jwt(serde_json::json!({"sub": "s1", "uid": "x1"}));
        let header = format!("Bearer {token}");
        let resolved =
            resolve_user_id(&headers(&[("authorization", &header)]), AuthMode::Jwt).unwrap();
        assert_eq!(resolved, "s1");

        let token = fake_jwt(serde_json::json!({"uid": "x1"}));
        let header = format!("Bearer {token}");
        let resolved =
            resolve_user_id(&headers(&[("authorization", &header)]), AuthMode::Jwt).unwrap();
        assert_eq!(resolved, "x1");
    }

    #[test]
    fn jwt_mode_rejects_missing_bearer() {
        assert!(resolve_user_id(&headers(&[]), AuthMode::Jwt).is_err());
    }
}
