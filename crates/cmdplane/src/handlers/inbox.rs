// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `inbox.list`: PRs where the user is reviewer/assignee,
//! ranked by priority then recency. Read-only, never proposed.

use super::{card_for_pr, read_call, sorted_inbox, HandlerCtx};
use crate::command::HandlerOutcome;

pub async fn handle(ctx: &HandlerCtx<'_>) -> HandlerOutcome {
    let prs = match read_call(ctx, ctx.state.codehost.list_user_prs(ctx.user_id)).await {
        Ok(prs) => prs,
        Err(outcome) => return outcome,
    };

    let items = sorted_inbox(prs);
    ctx.state.sessions.set_list_cursor(ctx.session_id, 0).await;

    if items.is_empty() {
        return HandlerOutcome::final_text("Your inbox is empty.");
    }

    let top3: Vec<String> =
        items.iter().take(3).map(|pr| format!("PR #{} by {}", pr.number, pr.author)).collect();
    let spoken = format!("You have {} items. First, {}.", items.len(), top3.join("; then "));
    let cards = items.iter().map(card_for_pr).collect();
    HandlerOutcome::Final { spoken, cards }
}
