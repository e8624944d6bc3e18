// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `CommandResponse` wire schema and the handler-facing
//! outcome type the router weaves pending-action/confirmation handling
//! around.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlaneError;
use crate::store::session::Card;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsePayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl ResponsePayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self { kind: "text".to_owned(), text: Some(text.into()), audio_uri: None, error_kind: None }
    }

    pub fn error(kind: PlaneError, text: impl Into<String>) -> Self {
        Self {
            kind: "error".to_owned(),
            text: Some(text.into()),
            audio_uri: None,
            error_kind: Some(kind.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentInfo {
    pub name: String,
    pub confidence: f32,
    pub entities: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingActionInfo {
    pub token: String,
    pub expires_at: u64,
    pub summary: String,
}

/// The schema returned from `POST /v1/command` and `POST
/// /v1/commands/confirm`. Persisted verbatim by the idempotency
/// layer, so a byte-identical replay is just
/// "return the cached value".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub response: ResponsePayload,
    pub intent: IntentInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_action: Option<PendingActionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Card>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub needs_confirmation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_rate: Option<f32>,
    pub request_id: String,
}

/// What a handler hands back to the router.
#[derive(Debug, Clone)]
pub enum HandlerOutcome {
    /// Read intents: no side effect.
    Final { spoken: String, cards: Vec<Card> },
    /// A side effect needing confirmation; the router wraps this into a
    /// pending action and a confirmation prompt.
    Propose { summary: String, entities: HashMap<String, Value> },
    /// A side effect already performed — either the confirm path, or a
    /// profile whose confirmation policy is `never`.
    Executed { spoken: String, cards: Vec<Card> },
    Error { kind: PlaneError, message: String },
}

impl HandlerOutcome {
    pub fn final_text(spoken: impl Into<String>) -> Self {
        Self::Final { spoken: spoken.into(), cards: Vec::new() }
    }

    pub fn error(kind: PlaneError, message: impl Into<String>) -> Self {
        Self::Error { kind, message: message.into() }
    }
}
