// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recognized configuration, loaded as CLI flags
//! with environment-variable fallback the way `coop-mux::config::MuxConfig`
//! does it.

use std::time::Duration;

/// Selects how `identity::resolve_user_id` reads the caller's identity out
/// of an already-authenticated request. The core never authenticates; this
/// only picks which header/claim shape the upstream authenticator left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "snake_case")]
pub enum AuthMode {
    Dev,
    Jwt,
    ApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "lower")]
pub enum SttProvider {
    Stub,
    Openai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "lower")]
pub enum TtsProvider {
    Stub,
    Openai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "lower")]
pub enum CodehostMode {
    Fixture,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "lower")]
pub enum KvBackend {
    Memory,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "lower")]
pub enum NotificationProvider {
    Logger,
    Apns,
    Fcm,
    Webpush,
}

#[derive(Debug, Clone, clap::Parser)]
pub struct PlaneConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "PLANE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080, env = "PLANE_PORT")]
    pub port: u16,

    #[arg(long, value_enum, default_value_t = AuthMode::Dev, env = "AUTH_MODE")]
    pub auth_mode: AuthMode,

    /// HMAC-SHA256 secret for webhook signature verification. Empty allows
    /// the literal "dev" bypass signature.
    #[arg(long, default_value = "", env = "WEBHOOK_SECRET")]
    pub webhook_secret: String,

    #[arg(long, value_enum, default_value_t = SttProvider::Stub, env = "STT_PROVIDER")]
    pub stt_provider: SttProvider,

    #[arg(long, value_enum, default_value_t = TtsProvider::Stub, env = "TTS_PROVIDER")]
    pub tts_provider: TtsProvider,

    #[arg(long, value_enum, default_value_t = CodehostMode::Fixture, env = "CODEHOST_MODE")]
    pub codehost_mode: CodehostMode,

    #[arg(long, env = "CODEHOST_TOKEN")]
    pub codehost_token: Option<String>,

    /// `:memory:` or a filesystem path. `:memory:` mandates test mode.
    #[arg(long, default_value = ":memory:", env = "DB_PATH")]
    pub db_path: String,

    #[arg(long, value_enum, default_value_t = KvBackend::Memory, env = "KV_BACKEND")]
    pub kv_backend: KvBackend,

    #[arg(long, value_enum, default_value_t = NotificationProvider::Logger, env = "NOTIFICATION_PROVIDER_DEFAULT")]
    pub notification_provider_default: NotificationProvider,

    #[arg(long, default_value = "agent-dispatch", env = "AGENT_DISPATCH_REPO")]
    pub agent_dispatch_repo: String,

    #[arg(long, default_value = "mock", env = "AGENT_DEFAULT_PROVIDER")]
    pub agent_default_provider: String,

    #[arg(long, default_value_t = false, env = "METRICS_ENABLED")]
    pub metrics_enabled: bool,

    /// Pending-action default TTL, seconds.
    #[arg(long, default_value_t = 60, env = "PENDING_ACTION_TTL_SECS")]
    pub pending_action_ttl_secs: u64,

    /// Session-context TTL, seconds.
    #[arg(long, default_value_t = 3600, env = "SESSION_TTL_SECS")]
    pub session_ttl_secs: u64,

    /// Notification dedupe window, seconds.
    #[arg(long, default_value_t = 300, env = "NOTIFICATION_DEDUPE_WINDOW_SECS")]
    pub notification_dedupe_window_secs: u64,

    /// Command idempotency-key replay window, seconds.
    #[arg(long, default_value_t = 600, env = "IDEMPOTENCY_WINDOW_SECS")]
    pub idempotency_window_secs: u64,

    /// Background sweep interval for expired KV entries, milliseconds.
    #[arg(long, default_value_t = 5000, env = "KV_SWEEP_INTERVAL_MS")]
    pub kv_sweep_interval_ms: u64,

    /// STT call deadline, milliseconds.
    #[arg(long, default_value_t = 5000, env = "STT_DEADLINE_MS")]
    pub stt_deadline_ms: u64,

    /// Code-host read-call deadline, milliseconds.
    #[arg(long, default_value_t = 10000, env = "CODEHOST_READ_DEADLINE_MS")]
    pub codehost_read_deadline_ms: u64,

    /// Code-host write-call deadline, milliseconds.
    #[arg(long, default_value_t = 15000, env = "CODEHOST_WRITE_DEADLINE_MS")]
    pub codehost_write_deadline_ms: u64,

    /// Per-endpoint push-provider call deadline, milliseconds.
    #[arg(long, default_value_t = 2000, env = "PUSH_DEADLINE_MS")]
    pub push_deadline_ms: u64,
}

impl PlaneConfig {
    pub fn pending_action_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_action_ttl_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn notification_dedupe_window(&self) -> Duration {
        Duration::from_secs(self.notification_dedupe_window_secs)
    }

    pub fn idempotency_window(&self) -> Duration {
        Duration::from_secs(self.idempotency_window_secs)
    }

    pub fn kv_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.kv_sweep_interval_ms)
    }

    pub fn stt_deadline(&self) -> Duration {
        Duration::from_millis(self.stt_deadline_ms)
    }

    pub fn codehost_read_deadline(&self) -> Duration {
        Duration::from_millis(self.codehost_read_deadline_ms)
    }

    pub fn codehost_write_deadline(&self) -> Duration {
        Duration::from_millis(self.codehost_write_deadline_ms)
    }

    pub fn push_deadline(&self) -> Duration {
        Duration::from_millis(self.push_deadline_ms)
    }

    /// `:memory:` DB path mandates test mode.
    pub fn is_test_mode(&self) -> bool {
        self.db_path == ":memory:"
    }
}
