// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pr.summarize`: details, checks, and reviews for one PR.
//! Read-only. Never reads code snippets or diffs — the only collaborator
//! calls made are metadata lookups, so privacy mode is honored
//! by construction rather than by an explicit flag.

use std::collections::HashMap;

use serde_json::Value;

use super::{focus_repo, read_call, resolve_pr_number, HandlerCtx};
use crate::collaborators::codehost::ReviewState;
use crate::command::HandlerOutcome;
use crate::store::session::Card;

pub async fn handle(ctx: &HandlerCtx<'_>, entities: &HashMap<String, Value>) -> HandlerOutcome {
    let pr_number = match resolve_pr_number(entities, &ctx.session) {
        Ok(n) => n,
        Err(outcome) => return outcome,
    };
    let repo = focus_repo(ctx);

    let pr = match read_call(ctx, ctx.state.codehost.get_pr(&repo, pr_number)).await {
        Ok(pr) => pr,
        Err(outcome) => return outcome,
    };
    let checks = read_call(ctx, ctx.state.codehost.get_checks(&repo, pr_number)).await.unwrap_or_default();
    let reviews = read_call(ctx, ctx.state.codehost.get_reviews(&repo, pr_number)).await.unwrap_or_default();

    let passing = checks.iter().filter(|c| c.passing).count();
    let approved = reviews.iter().filter(|r| r.state == ReviewState::Approved).count();
    let changes = reviews.iter().filter(|r| r.state == ReviewState::ChangesRequested).count();
    let comments = reviews.iter().filter(|r| r.state == ReviewState::Commented).count();

    let spoken = format!(
        "PR {} by {}: {}. Checks: {}/{} passing. Reviews: {} approved, {} changes requested, {} comments.",
        pr.number, pr.author, pr.title, passing, checks.len(), approved, changes, comments
    );

    ctx.state.sessions.set_repo_pr(ctx.session_id, repo, pr.number).await;

    let card = Card {
        kind: "pr".to_owned(),
        title: format!("PR #{}", pr.number),
        subtitle: Some(pr.title.clone()),
        lines: vec![
            format!("{passing}/{} checks passing", checks.len()),
            format!("{approved} approved, {changes} changes requested"),
        ],
        deep_link: None,
    };

    HandlerOutcome::Final { spoken, cards: vec![card] }
}
