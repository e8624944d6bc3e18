// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the command/event plane. Wires every route
//! the spec names onto [`http`] handlers over `Arc<AppState>`, the same
//! `Router<Arc<_>>` + layered-middleware shape the teacher's transport
//! builder uses.

pub mod http;
pub mod request_id;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the axum `Router` for the command/event plane.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/command", post(http::command))
        .route("/v1/commands/confirm", post(http::confirm))
        .route("/v1/webhooks/github", post(http::webhook_github))
        .route("/v1/webhooks/retry/{event_id}", post(http::webhook_retry))
        .route("/v1/dev/audio", post(http::dev_audio))
        .route("/v1/tts", post(http::tts))
        .route("/v1/notifications", get(http::list_notifications))
        .route("/v1/notifications/{id}", get(http::get_notification))
        .route(
            "/v1/notifications/subscriptions",
            post(http::create_notification_subscription).get(http::list_notification_subscriptions),
        )
        .route("/v1/notifications/subscriptions/{id}", delete(http::delete_notification_subscription))
        .route(
            "/v1/repos/subscriptions",
            post(http::create_repo_subscription).get(http::list_repo_subscriptions),
        )
        .route("/v1/repos/subscriptions/{*repo_full_name}", delete(http::delete_repo_subscription))
        .route("/v1/status", get(http::status))
        .route("/v1/metrics", get(http::metrics))
        .layer(middleware::from_fn(request_id::stamp_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
