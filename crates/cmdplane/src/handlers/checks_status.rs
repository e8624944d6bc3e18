// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `checks.status`: aggregate check-run status for a PR.
//! Read-only.

use std::collections::HashMap;

use serde_json::Value;

use super::{focus_repo, read_call, resolve_pr_number, HandlerCtx};
use crate::command::HandlerOutcome;
use crate::store::session::Card;

pub async fn handle(ctx: &HandlerCtx<'_>, entities: &HashMap<String, Value>) -> HandlerOutcome {
    let pr_number = match resolve_pr_number(entities, &ctx.session) {
        Ok(n) => n,
        Err(outcome) => return outcome,
    };
    let repo = focus_repo(ctx);

    let checks = match read_call(ctx, ctx.state.codehost.get_checks(&repo, pr_number)).await {
        Ok(checks) => checks,
        Err(outcome) => return outcome,
    };

    let passing = checks.iter().filter(|c| c.passing).count();
    let failing: Vec<&str> =
        checks.iter().filter(|c| !c.passing).map(|c| c.name.as_str()).collect();

    let spoken = if checks.is_empty() {
        format!("No checks have run on PR {pr_number} yet.")
    } else if failing.is_empty() {
        format!("{passing} of {} checks passing on PR {pr_number}.", checks.len())
    } else {
        format!(
            "{passing} of {} checks passing on PR {pr_number}, {} failing.",
            checks.len(),
            failing.join(", ")
        )
    };

    let card = Card {
        kind: "checks".to_owned(),
        title: format!("PR #{pr_number} checks"),
        subtitle: None,
        lines: checks
            .iter()
            .map(|c| format!("{}: {}", c.name, if c.passing { "passing" } else { "failing" }))
            .collect(),
        deep_link: None,
    };

    HandlerOutcome::Final { spoken, cards: vec![card] }
}
