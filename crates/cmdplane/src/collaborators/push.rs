// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Push-delivery provider.
//! `Send(endpoint, platform, payload) -> ok|err`. Delivery errors are logged,
//! never propagated to the notification creator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Apns,
    Fcm,
    Webpush,
}

#[derive(Debug, Clone)]
pub struct PushError(pub String);

impl std::fmt::Display for PushError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "push delivery failed: {}", self.0)
    }
}

impl std::error::Error for PushError {}

#[async_trait::async_trait]
pub trait PushProvider: Send + Sync {
    async fn send(
        &self,
        endpoint: &str,
        platform: Platform,
        payload: &serde_json::Value,
    ) -> Result<(), PushError>;
}

/// Logging-only provider: what every unconfigured platform falls back to
/// per spec §4.11 ("unconfigured platforms use a logging-only provider").
pub struct LoggingPushProvider;

#[async_trait::async_trait]
impl PushProvider for LoggingPushProvider {
    async fn send(
        &self,
        endpoint: &str,
        platform: Platform,
        payload: &serde_json::Value,
    ) -> Result<(), PushError> {
        tracing::info!(endpoint, platform = ?platform, payload = %payload, "push delivery (logger)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logging_provider_always_succeeds() {
        let provider = LoggingPushProvider;
        let result =
            provider.send("device-1", Platform::Webpush, &serde_json::json!({"a": 1})).await;
        assert!(result.is_ok());
    }
}
