// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared application state threaded through every axum handler via
//! `State<Arc<AppState>>`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::agent_task::service::AgentTaskService;
use crate::collaborators::codehost::CodeHost;
use crate::collaborators::push::PushProvider;
use crate::collaborators::secrets::SecretManager;
use crate::collaborators::stt::SttEngine;
use crate::collaborators::tts::TtsEngine;
use crate::config::PlaneConfig;
use crate::metrics::Metrics;
use crate::store::event_log::{EventLog, InMemoryEventLog};
use crate::store::idempotency::IdempotencyStore;
use crate::store::kv::{InMemoryKv, KvStore};
use crate::store::notification::NotificationStore;
use crate::store::pending_action::PendingActionManager;
use crate::store::repo_policy::RepoPolicyStore;
use crate::store::session::SessionStore;

/// Shared state for the command/event plane.
pub struct AppState {
    pub config: PlaneConfig,
    pub shutdown: CancellationToken,

    pub kv: Arc<dyn KvStore>,
    pub event_log: Arc<dyn EventLog>,
    pub notifications: Arc<NotificationStore>,
    pub pending_actions: Arc<PendingActionManager>,
    pub sessions: Arc<SessionStore>,
    pub idempotency: Arc<IdempotencyStore>,
    pub repo_policy: Arc<RepoPolicyStore>,
    pub agent_tasks: Arc<AgentTaskService>,

    pub stt: Arc<dyn SttEngine>,
    pub tts: Arc<dyn TtsEngine>,
    pub codehost: Arc<dyn CodeHost>,
    pub push: Arc<dyn PushProvider>,
    pub secrets: Arc<dyn SecretManager>,

    pub metrics: Metrics,
}

impl AppState {
    /// Build app state from config and collaborator implementations. Stores
    /// are always in-process; only the collaborators vary by config.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: PlaneConfig,
        shutdown: CancellationToken,
        stt: Arc<dyn SttEngine>,
        tts: Arc<dyn TtsEngine>,
        codehost: Arc<dyn CodeHost>,
        push: Arc<dyn PushProvider>,
        secrets: Arc<dyn SecretManager>,
    ) -> Arc<Self> {
        let kv_concrete = InMemoryKv::new();
        kv_concrete.spawn_sweeper(config.kv_sweep_interval(), shutdown.clone());
        let kv: Arc<dyn KvStore> = kv_concrete;
        let event_log: Arc<dyn EventLog> = InMemoryEventLog::new();
        let notifications = NotificationStore::with_push_deadline(
            push.clone(),
            config.notification_dedupe_window(),
            config.push_deadline(),
        );
        let pending_actions =
            PendingActionManager::new(Arc::clone(&kv), config.pending_action_ttl());
        let sessions = SessionStore::new(Arc::clone(&kv), config.session_ttl());
        let idempotency = IdempotencyStore::new(Arc::clone(&kv), config.idempotency_window());
        let repo_policy = RepoPolicyStore::new();
        let agent_tasks = AgentTaskService::new(config.agent_dispatch_repo.clone());

        Arc::new(Self {
            config,
            shutdown,
            kv,
            event_log,
            notifications: Arc::new(notifications),
            pending_actions: Arc::new(pending_actions),
            sessions: Arc::new(sessions),
            idempotency: Arc::new(idempotency),
            repo_policy: Arc::new(repo_policy),
            agent_tasks: Arc::new(agent_tasks),
            stt,
            tts,
            codehost,
            push,
            secrets,
            metrics: Metrics::new(),
        })
    }
}

/// Return current epoch millis. Every timestamp in the system is derived from this.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
