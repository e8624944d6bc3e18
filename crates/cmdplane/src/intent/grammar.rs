// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed intent grammar: an ordered list of regex patterns, first match
//! wins. Order encodes specificity — e.g. `pr.request_review`'s pattern is
//! checked before the more permissive `pr.summarize` one.

use std::collections::HashMap;

use regex::{Captures, Regex};

pub struct GrammarRule {
    pub intent_name: &'static str,
    pub pattern: Regex,
    pub extract: fn(&Captures) -> HashMap<String, serde_json::Value>,
}

fn no_entities(_: &Captures) -> HashMap<String, serde_json::Value> {
    HashMap::new()
}

fn int_entity(caps: &Captures, names: &[&str], key: &str) -> HashMap<String, serde_json::Value> {
    let mut entities = HashMap::new();
    for name in names {
        if let Some(m) = caps.name(name) {
            if let Ok(n) = m.as_str().parse::<i64>() {
                entities.insert(key.to_owned(), serde_json::json!(n));
                break;
            }
        }
    }
    entities
}

fn extract_set_profile(caps: &Captures) -> HashMap<String, serde_json::Value> {
    let mut entities = HashMap::new();
    if let Some(m) = caps.name("profile") {
        entities.insert("profile".to_owned(), serde_json::json!(m.as_str()));
    }
    entities
}

fn extract_request_review(caps: &Captures) -> HashMap<String, serde_json::Value> {
    let mut entities = int_entity(caps, &["pr_number"], "pr_number");
    if let Some(m) = caps.name("reviewer") {
        entities.insert("reviewer".to_owned(), serde_json::json!(m.as_str()));
    }
    entities
}

fn extract_merge(caps: &Captures) -> HashMap<String, serde_json::Value> {
    let mut entities = int_entity(caps, &["pr_number"], "pr_number");
    if caps.name("force").is_some() {
        entities.insert("force_merge".to_owned(), serde_json::json!(true));
    }
    entities
}

fn extract_checks_status(caps: &Captures) -> HashMap<String, serde_json::Value> {
    int_entity(caps, &["pr_number", "pr_number2"], "pr_number")
}

fn extract_pr_summarize(caps: &Captures) -> HashMap<String, serde_json::Value> {
    int_entity(caps, &["pr_number", "pr_number2"], "pr_number")
}

fn extract_agent_progress(caps: &Captures) -> HashMap<String, serde_json::Value> {
    let mut entities = HashMap::new();
    if let Some(m) = caps.name("task_id") {
        entities.insert("task_id".to_owned(), serde_json::json!(m.as_str()));
    }
    entities
}

fn extract_agent_delegate(caps: &Captures) -> HashMap<String, serde_json::Value> {
    let mut entities = HashMap::new();
    if let Some(m) = caps.name("instruction") {
        entities.insert("instruction".to_owned(), serde_json::json!(m.as_str().trim()));
    }
    entities
}

#[allow(clippy::unwrap_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

/// Builds the grammar table. Rebuilt per parse call — patterns are small and
/// parsing is not hot enough to warrant a `once_cell`/`lazy_static` table;
/// kept dependency-light per the teacher's own light touch with statics.
pub fn rules() -> Vec<GrammarRule> {
    vec![
        GrammarRule {
            intent_name: "system.confirm",
            pattern: compile(r"(?i)^\s*(confirm|yes|do it)\s*$"),
            extract: no_entities,
        },
        GrammarRule {
            intent_name: "system.cancel",
            pattern: compile(r"(?i)^\s*(cancel|no|stop)\s*$"),
            extract: no_entities,
        },
        GrammarRule {
            intent_name: "system.repeat",
            pattern: compile(r"(?i)^\s*(repeat|say that again)\s*$"),
            extract: no_entities,
        },
        GrammarRule {
            intent_name: "system.set_profile",
            pattern: compile(r"(?i)^\s*set profile to (?P<profile>\w+)\s*$"),
            extract: extract_set_profile,
        },
        GrammarRule {
            intent_name: "pr.request_review",
            pattern: compile(
                r"(?i)^\s*request review from (?P<reviewer>\w+) on pr (?P<pr_number>\d+)\s*$",
            ),
            extract: extract_request_review,
        },
        GrammarRule {
            intent_name: "pr.merge",
            pattern: compile(r"(?i)^\s*merge pr (?P<pr_number>\d+)(?P<force> force)?\s*$"),
            extract: extract_merge,
        },
        GrammarRule {
            intent_name: "checks.status",
            pattern: compile(
                r"(?i)^\s*(?:what'?s the status of pr (?P<pr_number>\d+)|are checks passing on (?:pr )?(?P<pr_number2>\d+))\s*$",
            ),
            extract: extract_checks_status,
        },
        GrammarRule {
            intent_name: "pr.summarize",
            pattern: compile(
                r"(?i)^\s*(?:summarize pr (?P<pr_number>\d+)|tell me about pr (?P<pr_number2>\d+))\s*$",
            ),
            extract: extract_pr_summarize,
        },
        GrammarRule {
            intent_name: "inbox.list",
            pattern: compile(
                r"(?i)^\s*(inbox|what'?s in my inbox|show my pull requests)\s*$",
            ),
            extract: no_entities,
        },
        GrammarRule {
            intent_name: "agent.progress",
            pattern: compile(r"(?i)^\s*how'?s the agent doing(?: on (?P<task_id>\S+))?\s*$"),
            extract: extract_agent_progress,
        },
        GrammarRule {
            intent_name: "agent.delegate",
            pattern: compile(r"(?i)^\s*have an agent (?P<instruction>.+)$"),
            extract: extract_agent_delegate,
        },
        GrammarRule {
            intent_name: "navigation.next",
            pattern: compile(r"(?i)^\s*next\s*$"),
            extract: no_entities,
        },
    ]
}
