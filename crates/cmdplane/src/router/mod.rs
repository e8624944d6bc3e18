// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The command router: the orchestrator tying intent parsing,
//! pending-action/confirmation, handler dispatch, profile shaping, session
//! persistence, and idempotency into one `Handle` call. `POST /v1/command`
//! calls [`handle`]; `POST /v1/commands/confirm` calls [`confirm_by_token`]
//! directly against the token rather than a transcript.

use std::collections::HashMap;
use std::sync::Arc;

use crate::command::{CommandResponse, HandlerOutcome, IntentInfo, PendingActionInfo, ResponsePayload};
use crate::error::{PlaneError, PlaneFailure};
use crate::handlers::{self, HandlerCtx};
use crate::intent::{self, ParsedIntent};
use crate::metrics::Metrics;
use crate::profile::Profile;
use crate::state::{epoch_ms, AppState};
use crate::store::session::{Card, SessionContext};

/// `input` resolution: either already-transcribed text,
/// or an audio reference that must be transcribed via the STT collaborator.
pub enum CommandInput {
    Text(String),
    Audio { uri: String, format: String },
}

/// Resolve `input` to a transcript, or a terminal `CommandResponse` when STT
/// is unavailable or times out.
async fn resolve_text(
    state: &Arc<AppState>,
    input: CommandInput,
    request_id: &str,
) -> Result<String, CommandResponse> {
    match input {
        CommandInput::Text(text) => Ok(text),
        CommandInput::Audio { uri, format } => {
            let path = uri.strip_prefix("file://").unwrap_or(&uri);
            let bytes = match tokio::time::timeout(
                state.config.stt_deadline(),
                tokio::fs::read(path),
            )
            .await
            {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(_)) | Err(_) => {
                    return Err(error_response(
                        PlaneError::Timeout,
                        "I'm having trouble hearing you.",
                        request_id,
                    ))
                }
            };

            match tokio::time::timeout(state.config.stt_deadline(), state.stt.transcribe(&bytes, &format))
                .await
            {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(_)) => Err(error_response(
                    PlaneError::Upstream,
                    "I'm having trouble hearing you.",
                    request_id,
                )),
                Err(_) => Err(error_response(
                    PlaneError::Timeout,
                    "I'm having trouble hearing you.",
                    request_id,
                )),
            }
        }
    }
}

fn error_response(kind: PlaneError, message: &str, request_id: &str) -> CommandResponse {
    CommandResponse {
        response: ResponsePayload::error(kind, message),
        intent: IntentInfo { name: "unknown".to_owned(), confidence: 0.0, entities: HashMap::new() },
        pending_action: None,
        cards: None,
        debug: None,
        needs_confirmation: false,
        speech_rate: None,
        request_id: request_id.to_owned(),
    }
}

/// `Handle(user_id, session_id, input, profile) -> CommandResponse`. Runs the full pipeline: input resolution, repeat/confirm/cancel
/// short-circuits, parse, dispatch, pending-action weave, profile shaping,
/// session persistence, and idempotency.
pub async fn handle(
    state: &Arc<AppState>,
    user_id: &str,
    session_id: &str,
    input: CommandInput,
    profile_param: &str,
    idempotency_key: Option<&str>,
    request_id: &str,
) -> CommandResponse {
    if let Some(key) = idempotency_key {
        if let Some(cached) = state.idempotency.get::<CommandResponse>(user_id, key).await {
            return cached;
        }
    }

    let response = handle_uncached(state, user_id, session_id, input, profile_param, request_id).await;

    if let Some(key) = idempotency_key {
        state.idempotency.put(user_id, key, &response).await;
    }

    Metrics::inc(&state.metrics.commands_handled);
    response
}

async fn handle_uncached(
    state: &Arc<AppState>,
    user_id: &str,
    session_id: &str,
    input: CommandInput,
    profile_param: &str,
    request_id: &str,
) -> CommandResponse {
    let text = match resolve_text(state, input, request_id).await {
        Ok(text) => text,
        Err(response) => return response,
    };

    let session = state.sessions.get(session_id).await;
    let effective_profile_str =
        session.as_ref().and_then(|s| s.active_profile.clone()).unwrap_or_else(|| profile_param.to_owned());
    let profile = Profile::parse_or_default(&effective_profile_str);

    let parsed = intent::parser::parse(&text);

    match parsed.name.as_str() {
        "system.repeat" => handle_repeat(session.as_ref(), profile, &parsed, request_id),
        "system.confirm" => {
            handle_confirm_shortcircuit(state, user_id, session_id, session, profile, &parsed, request_id)
                .await
        }
        "system.cancel" => {
            handle_cancel_shortcircuit(state, session_id, session, &parsed, request_id).await
        }
        "unknown" => handle_unknown(&parsed, profile, request_id),
        _ => {
            handle_dispatch(state, user_id, session_id, session, profile, parsed, request_id).await
        }
    }
}

fn handle_repeat(
    session: Option<&SessionContext>,
    profile: Profile,
    parsed: &ParsedIntent,
    request_id: &str,
) -> CommandResponse {
    match session.and_then(|s| s.last_response_spoken_text.clone()) {
        Some(text) => CommandResponse {
            response: ResponsePayload::text(text),
            intent: IntentInfo {
                name: parsed.name.clone(),
                confidence: parsed.confidence,
                entities: parsed.entities.clone(),
            },
            pending_action: None,
            cards: session.map(|s| s.last_cards.clone()),
            debug: None,
            needs_confirmation: false,
            speech_rate: Some(profile.speech_rate()),
            request_id: request_id.to_owned(),
        },
        None => error_response(PlaneError::NotFound, "There's nothing to repeat yet.", request_id),
    }
}

fn handle_unknown(parsed: &ParsedIntent, profile: Profile, request_id: &str) -> CommandResponse {
    let spoken = "I didn't catch that. Try saying 'inbox' or 'summarize PR 123'.";
    CommandResponse {
        response: ResponsePayload::text(crate::profile::shape(spoken, profile)),
        intent: IntentInfo {
            name: parsed.name.clone(),
            confidence: parsed.confidence,
            entities: parsed.entities.clone(),
        },
        pending_action: None,
        cards: None,
        debug: None,
        needs_confirmation: false,
        speech_rate: Some(profile.speech_rate()),
        request_id: request_id.to_owned(),
    }
}

async fn handle_cancel_shortcircuit(
    state: &Arc<AppState>,
    session_id: &str,
    session: Option<SessionContext>,
    parsed: &ParsedIntent,
    request_id: &str,
) -> CommandResponse {
    let Some(token) = session.as_ref().and_then(|s| s.pending_action_token.clone()) else {
        return error_response(PlaneError::NotFound, "There's nothing to cancel.", request_id);
    };

    let _ = state.pending_actions.consume(&token).await;
    state.sessions.set_pending_action_token(session_id, None).await;
    state.sessions.set_last_response(session_id, "Cancelled.", vec![]).await;

    CommandResponse {
        response: ResponsePayload::text("Cancelled."),
        intent: IntentInfo {
            name: parsed.name.clone(),
            confidence: parsed.confidence,
            entities: parsed.entities.clone(),
        },
        pending_action: None,
        cards: None,
        debug: None,
        needs_confirmation: false,
        speech_rate: None,
        request_id: request_id.to_owned(),
    }
}

async fn handle_confirm_shortcircuit(
    state: &Arc<AppState>,
    user_id: &str,
    session_id: &str,
    session: Option<SessionContext>,
    profile: Profile,
    _parsed: &ParsedIntent,
    request_id: &str,
) -> CommandResponse {
    let Some(token) = session.as_ref().and_then(|s| s.pending_action_token.clone()) else {
        return error_response(
            PlaneError::NotFound,
            "I don't have anything pending to confirm.",
            request_id,
        );
    };

    let mut response = match run_confirm(state, user_id, &token, profile).await {
        Ok(response) => response,
        Err(failure) => error_response(failure.kind, &failure.message, request_id),
    };
    response.request_id = request_id.to_owned();
    response
}

/// Consumes `token`, dispatches the stored intent's confirmed execution,
/// clears the owning session's pending-action pointer, shapes the result
/// with `profile`, and persists it as that session's last response.
/// Shared by the `system.confirm` transcript short-circuit and
/// `POST /v1/commands/confirm`.
async fn run_confirm(
    state: &Arc<AppState>,
    user_id: &str,
    token: &str,
    profile: Profile,
) -> Result<CommandResponse, PlaneFailure> {
    let action = state.pending_actions.consume(token).await?;
    Metrics::inc(&state.metrics.pending_actions_consumed);

    if action.user_id != user_id {
        return Err(PlaneFailure::not_found("unknown or already-consumed token"));
    }

    state.sessions.set_pending_action_token(&action.session_id, None).await;
    let session = state.sessions.get(&action.session_id).await;

    let ctx = HandlerCtx {
        state,
        user_id: &action.user_id,
        session_id: &action.session_id,
        session,
        profile,
    };
    let outcome = handlers::dispatch(&action.intent_name, &action.entities, &ctx, true).await;

    let (response_payload, cards, needs_confirmation) = match outcome {
        HandlerOutcome::Executed { spoken, cards } => {
            (ResponsePayload::text(crate::profile::shape(&spoken, profile)), Some(cards), false)
        }
        HandlerOutcome::Final { spoken, cards } => {
            (ResponsePayload::text(crate::profile::shape(&spoken, profile)), Some(cards), false)
        }
        HandlerOutcome::Error { kind, message } => (ResponsePayload::error(kind, message), None, false),
        HandlerOutcome::Propose { summary, .. } => {
            // A confirmed dispatch should never re-propose; treat as internal.
            (
                ResponsePayload::error(
                    PlaneError::Internal,
                    format!("handler re-proposed on confirm: {summary}"),
                ),
                None,
                false,
            )
        }
    };

    state
        .sessions
        .set_last_response(
            &action.session_id,
            response_payload.text.clone().unwrap_or_default(),
            cards.clone().unwrap_or_default(),
        )
        .await;

    Ok(CommandResponse {
        response: response_payload,
        intent: IntentInfo { name: action.intent_name, confidence: 1.0, entities: action.entities },
        pending_action: None,
        cards,
        debug: None,
        needs_confirmation,
        speech_rate: Some(profile.speech_rate()),
        request_id: String::new(),
    })
}

/// `POST /v1/commands/confirm`: confirms directly by token,
/// independent of any transcript or session focus. Returns `Err` (mapped to
/// an HTTP status, e.g. 404 on a double-consume) rather than embedding the
/// failure in a 200 response — the literal behavior spec §8 scenario 2
/// calls out.
pub async fn confirm_by_token(
    state: &Arc<AppState>,
    user_id: &str,
    token: &str,
    idempotency_key: Option<&str>,
    request_id: &str,
) -> Result<CommandResponse, PlaneFailure> {
    if let Some(key) = idempotency_key {
        if let Some(cached) = state.idempotency.get::<CommandResponse>(user_id, key).await {
            return Ok(cached);
        }
    }

    let mut response = run_confirm(state, user_id, token, Profile::Default).await?;
    response.request_id = request_id.to_owned();

    if let Some(key) = idempotency_key {
        state.idempotency.put(user_id, key, &response).await;
    }

    Ok(response)
}

async fn handle_dispatch(
    state: &Arc<AppState>,
    user_id: &str,
    session_id: &str,
    session: Option<SessionContext>,
    profile: Profile,
    parsed: ParsedIntent,
    request_id: &str,
) -> CommandResponse {
    let ctx = HandlerCtx { state, user_id, session_id, session, profile };
    let outcome = handlers::dispatch(&parsed.name, &parsed.entities, &ctx, false).await;

    let (response_payload, cards, pending_action, needs_confirmation) = match outcome {
        HandlerOutcome::Final { spoken, cards } => {
            (ResponsePayload::text(spoken), Some(cards), None, false)
        }
        HandlerOutcome::Executed { spoken, cards } => {
            (ResponsePayload::text(spoken), Some(cards), None, false)
        }
        HandlerOutcome::Error { kind, message } => (ResponsePayload::error(kind, message), None, None, false),
        HandlerOutcome::Propose { summary, entities } => {
            let token = state
                .pending_actions
                .create(&parsed.name, entities, &summary, user_id, session_id, None)
                .await;
            Metrics::inc(&state.metrics.pending_actions_issued);
            state.sessions.set_pending_action_token(session_id, Some(token.clone())).await;
            let expires_at = epoch_ms() + state.config.pending_action_ttl().as_millis() as u64;
            let spoken = format!("Ready to {summary}. Say confirm to proceed.");
            (
                ResponsePayload::text(spoken),
                None,
                Some(PendingActionInfo { token, expires_at, summary }),
                true,
            )
        }
    };

    let shaped_text = response_payload
        .text
        .as_ref()
        .map(|t| crate::profile::shape(t, profile))
        .unwrap_or_default();
    let mut response_payload = response_payload;
    response_payload.text = Some(shaped_text.clone());

    if pending_action.is_none() {
        let cards_to_store: Vec<Card> = cards.clone().unwrap_or_default();
        state.sessions.set_last_response(session_id, shaped_text, cards_to_store).await;
    } else {
        state.sessions.set_last_response(session_id, shaped_text, vec![]).await;
    }

    CommandResponse {
        response: response_payload,
        intent: IntentInfo { name: parsed.name, confidence: parsed.confidence, entities: parsed.entities },
        pending_action,
        cards,
        debug: None,
        needs_confirmation,
        speech_rate: Some(profile.speech_rate()),
        request_id: request_id.to_owned(),
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod router_tests;
