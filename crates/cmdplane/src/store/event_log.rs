// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only, durable store for webhook events. `Insert` is
//! the linearization point for replay protection: a duplicate
//! `(source, delivery_id)` fails the whole ingest with no further work.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::PlaneFailure;
use crate::state::epoch_ms;

/// A persisted webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub delivery_id: String,
    pub signature_ok: bool,
    #[serde(with = "payload_as_hex")]
    pub payload: Vec<u8>,
    pub received_at: u64,
    pub processed_ok: Option<bool>,
    pub processing_error: Option<String>,
    pub processed_at: Option<u64>,
}

mod payload_as_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

/// Filter for `List`.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub source: Option<String>,
    pub processed_ok: Option<Option<bool>>,
}

#[async_trait::async_trait]
pub trait EventLog: Send + Sync {
    /// Insert a new event. Fails with `PlaneFailure { kind: Conflict, .. }`
    /// if `(source, delivery_id)` already exists.
    async fn insert(
        &self,
        source: &str,
        event_type: &str,
        delivery_id: &str,
        signature_ok: bool,
        payload: Vec<u8>,
    ) -> Result<WebhookEvent, PlaneFailure>;

    async fn get(&self, id: Uuid) -> Option<WebhookEvent>;

    async fn list(&self, filter: EventFilter) -> Vec<WebhookEvent>;

    /// Mark an event processed. Only the `processed_*` triple ever mutates.
    async fn mark_processed(&self, id: Uuid, ok: bool, error: Option<String>);
}

/// In-process implementation. Durability is delegated to the caller's
/// process model in this deployment; a production backend would persist
/// to a relational table with a unique index on `(source, delivery_id)`.
pub struct InMemoryEventLog {
    events: RwLock<HashMap<Uuid, WebhookEvent>>,
    by_delivery: RwLock<HashMap<(String, String), Uuid>>,
}

impl InMemoryEventLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { events: RwLock::new(HashMap::new()), by_delivery: RwLock::new(HashMap::new()) })
    }
}

#[async_trait::async_trait]
impl EventLog for InMemoryEventLog {
    async fn insert(
        &self,
        source: &str,
        event_type: &str,
        delivery_id: &str,
        signature_ok: bool,
        payload: Vec<u8>,
    ) -> Result<WebhookEvent, PlaneFailure> {
        let key = (source.to_owned(), delivery_id.to_owned());
        let mut by_delivery = self.by_delivery.write().await;
        if by_delivery.contains_key(&key) {
            return Err(PlaneFailure::conflict("duplicate delivery"));
        }

        let event = WebhookEvent {
            id: Uuid::new_v4(),
            source: source.to_owned(),
            event_type: event_type.to_owned(),
            delivery_id: delivery_id.to_owned(),
            signature_ok,
            payload,
            received_at: epoch_ms(),
            processed_ok: None,
            processing_error: None,
            processed_at: None,
        };

        by_delivery.insert(key, event.id);
        self.events.write().await.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get(&self, id: Uuid) -> Option<WebhookEvent> {
        self.events.read().await.get(&id).cloned()
    }

    async fn list(&self, filter: EventFilter) -> Vec<WebhookEvent> {
        let events = self.events.read().await;
        let mut out: Vec<_> = events
            .values()
            .filter(|e| filter.source.as_deref().map_or(true, |s| s == e.source))
            .filter(|e| filter.processed_ok.map_or(true, |p| p == e.processed_ok))
            .cloned()
            .collect();
        out.sort_by_key(|e| std::cmp::Reverse(e.received_at));
        out
    }

    async fn mark_processed(&self, id: Uuid, ok: bool, error: Option<String>) {
        let mut events = self.events.write().await;
        if let Some(e) = events.get_mut(&id) {
            e.processed_ok = Some(ok);
            e.processing_error = error;
            e.processed_at = Some(epoch_ms());
        }
    }
}

#[cfg(test)]
#[path = "event_log_tests.rs"]
mod event_log_tests;
