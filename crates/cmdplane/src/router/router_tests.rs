use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::*;
use crate::collaborators::codehost::{
    CheckRun, CodeHost, CodeHostError, FixtureCodeHost, PullRequest, Review,
};
use crate::collaborators::push::LoggingPushProvider;
use crate::collaborators::secrets::EnvSecretManager;
use crate::collaborators::stt::StubSttEngine;
use crate::collaborators::tts::StubTtsEngine;
use crate::config::{AuthMode, CodehostMode, KvBackend, NotificationProvider, PlaneConfig, SttProvider, TtsProvider};

/// Never resolves inside the test's deadline; used to prove a hung code
/// host surfaces `error(kind="timeout")` instead of hanging the request.
struct HangingCodeHost;

#[async_trait::async_trait]
impl CodeHost for HangingCodeHost {
    async fn list_user_prs(&self, _user_id: &str) -> Result<Vec<PullRequest>, CodeHostError> {
        std::future::pending().await
    }

    async fn get_pr(&self, _repo: &str, _number: i64) -> Result<PullRequest, CodeHostError> {
        std::future::pending().await
    }

    async fn get_checks(&self, _repo: &str, _number: i64) -> Result<Vec<CheckRun>, CodeHostError> {
        std::future::pending().await
    }

    async fn get_reviews(&self, _repo: &str, _number: i64) -> Result<Vec<Review>, CodeHostError> {
        std::future::pending().await
    }

    async fn request_review(
        &self,
        _repo: &str,
        _number: i64,
        _reviewer: &str,
    ) -> Result<(), CodeHostError> {
        std::future::pending().await
    }

    async fn merge(&self, _repo: &str, _number: i64) -> Result<(), CodeHostError> {
        std::future::pending().await
    }
}

fn test_config() -> PlaneConfig {
    PlaneConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
        auth_mode: AuthMode::Dev,
        webhook_secret: String::new(),
        stt_provider: SttProvider::Stub,
        tts_provider: TtsProvider::Stub,
        codehost_mode: CodehostMode::Fixture,
        codehost_token: None,
        db_path: ":memory:".to_owned(),
        kv_backend: KvBackend::Memory,
        notification_provider_default: NotificationProvider::Logger,
        agent_dispatch_repo: "org/dispatch".to_owned(),
        agent_default_provider: "mock".to_owned(),
        metrics_enabled: false,
        pending_action_ttl_secs: 60,
        session_ttl_secs: 3600,
        notification_dedupe_window_secs: 300,
        idempotency_window_secs: 600,
        kv_sweep_interval_ms: 5000,
        stt_deadline_ms: 5000,
        codehost_read_deadline_ms: 10000,
        codehost_write_deadline_ms: 15000,
        push_deadline_ms: 2000,
    }
}

fn test_state() -> Arc<AppState> {
    AppState::new(
        test_config(),
        CancellationToken::new(),
        Arc::new(StubSttEngine),
        Arc::new(StubTtsEngine),
        Arc::new(FixtureCodeHost::new()),
        Arc::new(LoggingPushProvider),
        Arc::new(EnvSecretManager),
    )
}

/// A code host that never answers, paired with a 1ms read/write deadline so
/// `handlers::read_call`/`write_call` hit their timeout branch immediately.
fn test_state_with_hung_codehost() -> Arc<AppState> {
    let mut config = test_config();
    config.codehost_read_deadline_ms = 1;
    config.codehost_write_deadline_ms = 1;
    AppState::new(
        config,
        CancellationToken::new(),
        Arc::new(StubSttEngine),
        Arc::new(StubTtsEngine),
        Arc::new(HangingCodeHost),
        Arc::new(LoggingPushProvider),
        Arc::new(EnvSecretManager),
    )
}

#[tokio::test]
async fn inbox_list_is_a_final_read_with_no_confirmation() {
    let state = test_state();
    let response = handle(&state, "alice", "s1", CommandInput::Text("inbox".to_owned()), "default", None, "r1").await;
    assert_eq!(response.intent.name, "inbox.list");
    assert!(!response.needs_confirmation);
    assert!(response.pending_action.is_none());
    assert_eq!(response.request_id, "r1");
}

#[tokio::test]
async fn merge_proposes_then_confirms_via_transcript() {
    let state = test_state();
    let proposal =
        handle(&state, "alice", "s1", CommandInput::Text("merge pr 412".to_owned()), "default", None, "r1").await;
    assert!(proposal.needs_confirmation);
    let pending = proposal.pending_action.expect("expected a pending action");

    let confirmed =
        handle(&state, "alice", "s1", CommandInput::Text("confirm".to_owned()), "default", None, "r2").await;
    assert!(!confirmed.needs_confirmation);
    assert_eq!(confirmed.response.text.as_deref(), Some("PR 412 merged."));

    // Token is single-use: confirming again has nothing pending.
    assert!(state.pending_actions.peek(&pending.token).await.is_err());
}

#[tokio::test]
async fn merge_confirmed_directly_by_token_endpoint() {
    let state = test_state();
    let proposal =
        handle(&state, "alice", "s1", CommandInput::Text("merge pr 412".to_owned()), "default", None, "r1").await;
    let pending = proposal.pending_action.expect("expected a pending action");

    let confirmed = confirm_by_token(&state, "alice", &pending.token, None, "r2").await.unwrap();
    assert_eq!(confirmed.response.text.as_deref(), Some("PR 412 merged."));

    let retry = confirm_by_token(&state, "alice", &pending.token, None, "r3").await;
    assert!(retry.is_err());
}

#[tokio::test]
async fn confirm_token_rejects_mismatched_user() {
    let state = test_state();
    let proposal =
        handle(&state, "alice", "s1", CommandInput::Text("merge pr 412".to_owned()), "default", None, "r1").await;
    let pending = proposal.pending_action.expect("expected a pending action");

    let result = confirm_by_token(&state, "mallory", &pending.token, None, "r2").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn cancel_shortcircuit_clears_pending_action() {
    let state = test_state();
    let proposal =
        handle(&state, "alice", "s1", CommandInput::Text("merge pr 412".to_owned()), "default", None, "r1").await;
    let pending = proposal.pending_action.expect("expected a pending action");

    let cancelled =
        handle(&state, "alice", "s1", CommandInput::Text("cancel".to_owned()), "default", None, "r2").await;
    assert_eq!(cancelled.response.text.as_deref(), Some("Cancelled."));
    assert!(state.pending_actions.peek(&pending.token).await.is_err());
}

#[tokio::test]
async fn repeat_echoes_the_last_spoken_response() {
    let state = test_state();
    let first =
        handle(&state, "alice", "s1", CommandInput::Text("inbox".to_owned()), "default", None, "r1").await;
    let repeated =
        handle(&state, "alice", "s1", CommandInput::Text("repeat".to_owned()), "default", None, "r2").await;
    assert_eq!(repeated.response.text, first.response.text);
}

#[tokio::test]
async fn repeat_with_no_prior_response_is_not_found() {
    let state = test_state();
    let response =
        handle(&state, "alice", "s2", CommandInput::Text("repeat".to_owned()), "default", None, "r1").await;
    assert_eq!(response.response.error_kind.as_deref(), Some("not_found"));
}

#[tokio::test]
async fn idempotency_key_replays_the_cached_response() {
    let state = test_state();
    let first = handle(
        &state,
        "alice",
        "s1",
        CommandInput::Text("inbox".to_owned()),
        "default",
        Some("key-1"),
        "r1",
    )
    .await;
    let second = handle(
        &state,
        "alice",
        "s1",
        CommandInput::Text("summarize pr 412".to_owned()),
        "default",
        Some("key-1"),
        "r2",
    )
    .await;
    assert_eq!(second.intent.name, first.intent.name);
    assert_eq!(second.request_id, first.request_id);
}

#[tokio::test]
async fn workout_profile_forces_confirmation_and_shapes_the_prompt() {
    let state = test_state();
    let response = handle(
        &state,
        "alice",
        "s1",
        CommandInput::Text("merge pr 412".to_owned()),
        "workout",
        None,
        "r1",
    )
    .await;
    assert!(response.needs_confirmation);
    assert!(response.response.text.as_ref().unwrap().split_whitespace().count() <= 15);
}

#[tokio::test]
async fn unknown_text_returns_the_unknown_intent() {
    let state = test_state();
    let response = handle(
        &state,
        "alice",
        "s1",
        CommandInput::Text("what is the meaning of life".to_owned()),
        "default",
        None,
        "r1",
    )
    .await;
    assert_eq!(response.intent.name, "unknown");
}

#[tokio::test]
async fn audio_input_is_transcribed_via_stt_stub() {
    let state = test_state();
    let dir = std::env::temp_dir().join(format!("cmdplane-router-test-{}", uuid::Uuid::new_v4()));
    tokio::fs::write(&dir, b"inbox").await.unwrap();
    let uri = format!("file://{}", dir.display());

    let response = handle(
        &state,
        "alice",
        "s1",
        CommandInput::Audio { uri, format: "wav".to_owned() },
        "default",
        None,
        "r1",
    )
    .await;
    assert_eq!(response.intent.name, "inbox.list");
    let _ = tokio::fs::remove_file(&dir).await;
}

#[tokio::test]
async fn audio_input_missing_file_becomes_a_timeout_error() {
    let state = test_state();
    let response = handle(
        &state,
        "alice",
        "s1",
        CommandInput::Audio { uri: "file:///no/such/path".to_owned(), format: "wav".to_owned() },
        "default",
        None,
        "r1",
    )
    .await;
    assert_eq!(response.response.error_kind.as_deref(), Some("timeout"));
}

#[tokio::test]
async fn hung_codehost_read_becomes_a_timeout_error() {
    let state = test_state_with_hung_codehost();
    let response = handle(&state, "alice", "s1", CommandInput::Text("inbox".to_owned()), "default", None, "r1").await;
    assert_eq!(response.response.error_kind.as_deref(), Some("timeout"));
}

#[tokio::test]
async fn hung_codehost_write_becomes_a_timeout_error_on_confirm() {
    let state = test_state_with_hung_codehost();
    let proposal =
        handle(&state, "alice", "s1", CommandInput::Text("merge pr 412".to_owned()), "default", None, "r1").await;
    assert!(proposal.needs_confirmation);

    let confirmed =
        handle(&state, "alice", "s1", CommandInput::Text("confirm".to_owned()), "default", None, "r2").await;
    assert_eq!(confirmed.response.error_kind.as_deref(), Some("timeout"));
}
