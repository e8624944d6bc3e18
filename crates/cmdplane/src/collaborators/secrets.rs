// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret manager: opaque key/value lookup by
//! reference string. Reference formats: `env://KEY`, `vault://path`,
//! `aws://name`, `gcp://name`.

#[derive(Debug, Clone)]
pub struct SecretError(pub String);

impl std::fmt::Display for SecretError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "secret resolution failed: {}", self.0)
    }
}

impl std::error::Error for SecretError {}

#[async_trait::async_trait]
pub trait SecretManager: Send + Sync {
    async fn resolve(&self, reference: &str) -> Result<String, SecretError>;
}

/// Resolves only `env://KEY` references against the process environment;
/// everything else is out of scope for this deployment shape (no vault/cloud
/// secret backend wired up).
pub struct EnvSecretManager;

#[async_trait::async_trait]
impl SecretManager for EnvSecretManager {
    async fn resolve(&self, reference: &str) -> Result<String, SecretError> {
        let key = reference
            .strip_prefix("env://")
            .ok_or_else(|| SecretError(format!("unsupported reference scheme: {reference}")))?;
        std::env::var(key).map_err(|_| SecretError(format!("env var not set: {key}")))
    }
}
