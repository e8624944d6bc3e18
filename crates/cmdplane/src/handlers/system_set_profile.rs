// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `system.set_profile`: persists the caller's chosen profile
//! onto the session so subsequent commands on it default to that profile
//! even if the client forgets to re-send it on `POST /v1/command`.

use std::collections::HashMap;

use serde_json::Value;

use super::HandlerCtx;
use crate::command::HandlerOutcome;
use crate::error::PlaneError;
use crate::profile::Profile;

pub async fn handle(ctx: &HandlerCtx<'_>, entities: &HashMap<String, Value>) -> HandlerOutcome {
    let Some(requested) = entities.get("profile").and_then(Value::as_str) else {
        return HandlerOutcome::error(PlaneError::Validation, "Which profile?");
    };

    let profile = Profile::parse_or_default(requested);
    ctx.state.sessions.set_active_profile(ctx.session_id, profile.as_str()).await;
    HandlerOutcome::final_text(format!("Profile set to {}.", profile.as_str()))
}
