// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cmdplane: the hands-free developer-assistant command/event plane.

pub mod agent_task;
pub mod collaborators;
pub mod command;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod intent;
pub mod metrics;
pub mod profile;
pub mod router;
pub mod state;
pub mod store;
pub mod transport;
pub mod webhook;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::collaborators::codehost::FixtureCodeHost;
use crate::collaborators::push::LoggingPushProvider;
use crate::collaborators::secrets::EnvSecretManager;
use crate::collaborators::stt::StubSttEngine;
use crate::collaborators::tts::StubTtsEngine;
use crate::config::{CodehostMode, PlaneConfig, SttProvider, TtsProvider};
use crate::state::AppState;
use crate::transport::build_router;

/// Run the command/event plane until shutdown.
///
/// Collaborator wiring is intentionally narrow: only the `Stub`/`Fixture`
/// implementations ship in this deployment shape. A config asking for a live provider still
/// boots, on the stub, with a warning — the same degrade-rather-than-fail
/// posture spec §4.1 requires of the KV layer.
pub async fn run(config: PlaneConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    if config.stt_provider != SttProvider::Stub {
        tracing::warn!(provider = ?config.stt_provider, "STT provider not implemented, falling back to stub");
    }
    if config.tts_provider != TtsProvider::Stub {
        tracing::warn!(provider = ?config.tts_provider, "TTS provider not implemented, falling back to stub");
    }
    if config.codehost_mode != CodehostMode::Fixture {
        tracing::warn!(mode = ?config.codehost_mode, "codehost mode not implemented, falling back to fixture");
    }

    let state = AppState::new(
        config,
        shutdown.clone(),
        Arc::new(StubSttEngine),
        Arc::new(StubTtsEngine),
        Arc::new(FixtureCodeHost::new()),
        Arc::new(LoggingPushProvider),
        Arc::new(EnvSecretManager),
    );

    tracing::info!("cmdplane listening on {addr}");
    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}
