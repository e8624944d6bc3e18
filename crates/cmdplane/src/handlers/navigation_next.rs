// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `navigation.next`: advance `session.list_cursor` through the
//! last-listed inbox ordering and re-summarize that item.

use super::{card_for_pr, read_call, sorted_inbox, HandlerCtx};
use crate::command::HandlerOutcome;
use crate::error::PlaneError;

pub async fn handle(ctx: &HandlerCtx<'_>) -> HandlerOutcome {
    let Some(session) = &ctx.session else {
        return HandlerOutcome::error(
            PlaneError::Validation,
            "There's nothing to go to next — try 'inbox' first.",
        );
    };

    let next_cursor = session.list_cursor.unwrap_or(0) + 1;
    let prs = match read_call(ctx, ctx.state.codehost.list_user_prs(ctx.user_id)).await {
        Ok(prs) => prs,
        Err(outcome) => return outcome,
    };
    let items = sorted_inbox(prs);

    match items.get(next_cursor as usize) {
        Some(pr) => {
            ctx.state.sessions.set_list_cursor(ctx.session_id, next_cursor).await;
            ctx.state.sessions.set_repo_pr(ctx.session_id, pr.repo.clone(), pr.number).await;
            HandlerOutcome::Final {
                spoken: format!("PR #{} by {}: {}.", pr.number, pr.author, pr.title),
                cards: vec![card_for_pr(pr)],
            }
        }
        None => HandlerOutcome::final_text("That's the end of the list."),
    }
}
