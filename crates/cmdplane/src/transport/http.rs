// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the command/event plane. Every handler
//! resolves the caller's identity via [`crate::identity::resolve_user_id`]
//! per the configured `AUTH_MODE` — the core never authenticates, it only
//! reads what an upstream authenticator already resolved.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collaborators::push::Platform;
use crate::error::{PlaneError, PlaneFailure};
use crate::identity::resolve_user_id;
use crate::router::{self, CommandInput};
use crate::state::AppState;
use crate::transport::request_id::RequestId;
use crate::webhook;

fn failure_response(failure: PlaneFailure) -> axum::response::Response {
    failure.kind.to_http_response(failure.message).into_response()
}

fn identity_or_response(headers: &HeaderMap, state: &AppState) -> Result<String, axum::response::Response> {
    resolve_user_id(headers, state.config.auth_mode).map_err(failure_response)
}

// -- POST /v1/command ---------------------------------------------------

#[derive(Debug, Deserialize)]
struct InputPayload {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
    uri: Option<String>,
    #[serde(default)]
    format: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ClientContext {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    debug: bool,
}

#[derive(Debug, Deserialize)]
struct CommandRequestBody {
    input: InputPayload,
    #[serde(default)]
    profile: Option<String>,
    #[serde(default)]
    client_context: Option<serde_json::Value>,
    #[serde(default)]
    idempotency_key: Option<String>,
}

/// `POST /v1/command`.
pub async fn command(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Extension(request_id): Extension<RequestId>,
    Json(body): Json<CommandRequestBody>,
) -> axum::response::Response {
    let user_id = match identity_or_response(&headers, &state) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let ctx: ClientContext = body
        .client_context
        .as_ref()
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();
    let session_id = ctx.session_id.unwrap_or_else(|| format!("session:{user_id}"));

    let input = match body.input.kind.as_str() {
        "text" => match body.input.text {
            Some(text) => CommandInput::Text(text),
            None => {
                return PlaneError::Validation
                    .to_http_response("input.text is required for type=text")
                    .into_response()
            }
        },
        "audio" => match body.input.uri {
            Some(uri) => {
                CommandInput::Audio { uri, format: body.input.format.unwrap_or_else(|| "wav".to_owned()) }
            }
            None => {
                return PlaneError::Validation
                    .to_http_response("input.uri is required for type=audio")
                    .into_response()
            }
        },
        other => {
            return PlaneError::Validation
                .to_http_response(format!("unrecognized input.type '{other}'"))
                .into_response()
        }
    };

    let profile = body.profile.unwrap_or_else(|| "default".to_owned());
    let request_id_str = request_id.0.to_string();
    let mut response = router::handle(
        &state,
        &user_id,
        &session_id,
        input,
        &profile,
        body.idempotency_key.as_deref(),
        &request_id_str,
    )
    .await;

    if !ctx.debug {
        response.debug = None;
    }

    Json(response).into_response()
}

// -- POST /v1/commands/confirm -------------------------------------------

#[derive(Debug, Deserialize)]
struct ConfirmRequestBody {
    token: String,
    #[serde(default)]
    idempotency_key: Option<String>,
}

/// `POST /v1/commands/confirm`. A double-consume of the same
/// token surfaces as 404, not a 200 error envelope.
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Extension(request_id): Extension<RequestId>,
    Json(body): Json<ConfirmRequestBody>,
) -> axum::response::Response {
    let user_id = match identity_or_response(&headers, &state) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let request_id_str = request_id.0.to_string();
    match router::confirm_by_token(
        &state,
        &user_id,
        &body.token,
        body.idempotency_key.as_deref(),
        &request_id_str,
    )
    .await
    {
        Ok(response) => Json(response).into_response(),
        Err(failure) => failure.kind.to_http_response(failure.message).into_response(),
    }
}

// -- POST /v1/webhooks/github ---------------------------------------------

/// `POST /v1/webhooks/github`. Status codes: 202 on accept
/// or duplicate, 400 on bad signature.
pub async fn webhook_github(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let event_type = headers
        .get("x-github-event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_owned();
    let delivery_id = match headers.get("x-github-delivery").and_then(|v| v.to_str().ok()) {
        Some(id) => id.to_owned(),
        None => {
            return PlaneError::Validation
                .to_http_response("missing X-GitHub-Delivery")
                .into_response()
        }
    };
    let signature = headers.get("x-hub-signature-256").and_then(|v| v.to_str().ok()).unwrap_or("");

    let signature_ok = webhook::verify_signature(&state.config.webhook_secret, signature, &body);
    if !signature_ok {
        return PlaneError::Validation.to_http_response("bad webhook signature").into_response();
    }

    match webhook::ingest(&state, "github", &event_type, &delivery_id, signature_ok, body.to_vec()).await {
        Ok(_) => StatusCode::ACCEPTED.into_response(),
        Err(failure) => failure.kind.to_http_response(failure.message).into_response(),
    }
}

/// `POST /v1/webhooks/retry/{event_id}`.
pub async fn webhook_retry(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
) -> axum::response::Response {
    if state.config.auth_mode != crate::config::AuthMode::Dev {
        return PlaneError::Forbidden.to_http_response("dev-only endpoint").into_response();
    }
    match webhook::retry(&state, event_id).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(failure) => failure.kind.to_http_response(failure.message).into_response(),
    }
}

// -- POST /v1/dev/audio ---------------------------------------------------

#[derive(Debug, Deserialize)]
struct DevAudioRequest {
    data_base64: String,
    format: String,
}

#[derive(Debug, Serialize)]
struct DevAudioResponse {
    uri: String,
}

/// Minimal standard-alphabet base64 (with `=` padding) decoder, the same
/// hand-rolled-for-one-call shape `identity::base64_url_decode` uses for the
/// JWT payload segment — not worth a crate dependency for a dev-only shim.
fn base64_decode(input: &str) -> Option<Vec<u8>> {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut table = [255u8; 256];
    for (i, &c) in ALPHABET.iter().enumerate() {
        table[c as usize] = i as u8;
    }
    let mut bits: u32 = 0;
    let mut nbits = 0u32;
    let mut out = Vec::with_capacity(input.len() * 3 / 4);
    for c in input.bytes() {
        if c == b'=' {
            break;
        }
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

/// `POST /v1/dev/audio`: writes the decoded payload to a
/// local tmp path and returns it as a `file://` URI the STT collaborator
/// can read back.
pub async fn dev_audio(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DevAudioRequest>,
) -> axum::response::Response {
    if state.config.auth_mode != crate::config::AuthMode::Dev {
        return PlaneError::Forbidden.to_http_response("dev-only endpoint").into_response();
    }
    let Some(bytes) = base64_decode(&body.data_base64) else {
        return PlaneError::Validation.to_http_response("invalid base64 payload").into_response();
    };

    let path = std::env::temp_dir().join(format!("cmdplane-audio-{}.{}", Uuid::new_v4(), body.format));
    if let Err(e) = tokio::fs::write(&path, &bytes).await {
        tracing::error!(err = %e, "failed to write dev audio payload");
        return PlaneError::Internal.to_http_response("failed to persist audio payload").into_response();
    }

    Json(DevAudioResponse { uri: format!("file://{}", path.display()) }).into_response()
}

// -- POST /v1/tts -----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TtsRequest {
    text: String,
    #[serde(default = "default_voice")]
    voice: String,
    #[serde(default = "default_format")]
    format: String,
}

fn default_voice() -> String {
    "default".to_owned()
}

fn default_format() -> String {
    "wav".to_owned()
}

/// `POST /v1/tts`: raw audio bytes with `Content-Type: audio/{fmt}`.
pub async fn tts(State(state): State<Arc<AppState>>, Json(body): Json<TtsRequest>) -> axum::response::Response {
    match state.tts.synthesize(&body.text, &body.voice, &body.format).await {
        Ok(bytes) => {
            let content_type = format!("audio/{}", body.format);
            ([("content-type", content_type)], bytes).into_response()
        }
        Err(e) => PlaneError::Upstream.to_http_response(e.to_string()).into_response(),
    }
}

// -- Notifications ----------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    since: Option<u64>,
    limit: Option<usize>,
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<NotificationsQuery>,
) -> axum::response::Response {
    let user_id = match identity_or_response(&headers, &state) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let notifications = state.notifications.list(&user_id, query.since, query.limit.unwrap_or(50)).await;
    Json(serde_json::json!({ "notifications": notifications, "count": notifications.len() })).into_response()
}

pub async fn get_notification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    let user_id = match identity_or_response(&headers, &state) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.notifications.get(&user_id, id).await {
        Some(n) => Json(n).into_response(),
        None => PlaneError::NotFound.to_http_response("notification not found").into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    endpoint: String,
    platform: Platform,
    #[serde(default)]
    subscription_keys: Option<serde_json::Value>,
}

pub async fn create_notification_subscription(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateSubscriptionRequest>,
) -> axum::response::Response {
    let user_id = match identity_or_response(&headers, &state) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let sub = state
        .notifications
        .upsert_subscription(&user_id, body.platform, &body.endpoint, body.subscription_keys)
        .await;
    Json(sub).into_response()
}

pub async fn list_notification_subscriptions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let user_id = match identity_or_response(&headers, &state) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    Json(state.notifications.list_subscriptions(&user_id).await).into_response()
}

pub async fn delete_notification_subscription(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    let user_id = match identity_or_response(&headers, &state) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if state.notifications.delete_subscription(&user_id, id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        PlaneError::NotFound.to_http_response("subscription not found").into_response()
    }
}

// -- Repo subscriptions -------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateRepoSubscriptionRequest {
    repo_full_name: String,
    #[serde(default)]
    installation_id: Option<String>,
}

pub async fn create_repo_subscription(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateRepoSubscriptionRequest>,
) -> axum::response::Response {
    let user_id = match identity_or_response(&headers, &state) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let sub = state
        .notifications
        .upsert_repo_subscription(&user_id, &body.repo_full_name, body.installation_id)
        .await;
    Json(sub).into_response()
}

pub async fn list_repo_subscriptions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let user_id = match identity_or_response(&headers, &state) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    Json(state.notifications.list_repo_subscriptions(&user_id).await).into_response()
}

pub async fn delete_repo_subscription(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(repo_full_name): Path<String>,
) -> axum::response::Response {
    let user_id = match identity_or_response(&headers, &state) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if state.notifications.delete_repo_subscription(&user_id, &repo_full_name).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        PlaneError::NotFound.to_http_response("repo subscription not found").into_response()
    }
}

// -- Status & metrics ---------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
    version: String,
    stt_provider: String,
    tts_provider: String,
    auth_mode: String,
}

pub async fn status(State(state): State<Arc<AppState>>) -> axum::response::Response {
    Json(StatusResponse {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        stt_provider: format!("{:?}", state.config.stt_provider).to_ascii_lowercase(),
        tts_provider: format!("{:?}", state.config.tts_provider).to_ascii_lowercase(),
        auth_mode: format!("{:?}", state.config.auth_mode).to_ascii_lowercase(),
    })
    .into_response()
}

/// `GET /v1/metrics`.
pub async fn metrics(State(state): State<Arc<AppState>>) -> axum::response::Response {
    if !state.config.metrics_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(state.metrics.snapshot(&state.notifications)).into_response()
}
