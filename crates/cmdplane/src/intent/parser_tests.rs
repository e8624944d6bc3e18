use super::*;

#[test]
fn parses_confirm_variants() {
    for text in ["confirm", "yes", "do it", "CONFIRM"] {
        assert_eq!(parse(text).name, "system.confirm");
    }
}

#[test]
fn parses_cancel_variants() {
    for text in ["cancel", "no", "stop"] {
        assert_eq!(parse(text).name, "system.cancel");
    }
}

#[test]
fn parses_repeat() {
    for text in ["repeat", "say that again"] {
        assert_eq!(parse(text).name, "system.repeat");
    }
}

#[test]
fn parses_set_profile_with_entity() {
    let parsed = parse("set profile to workout");
    assert_eq!(parsed.name, "system.set_profile");
    assert_eq!(parsed.entities["profile"], "workout");
}

#[test]
fn parses_inbox_list_variants() {
    for text in ["inbox", "what's in my inbox", "show my pull requests"] {
        assert_eq!(parse(text).name, "inbox.list");
    }
}

#[test]
fn parses_pr_summarize_with_pr_number() {
    for text in ["summarize pr 412", "tell me about pr 412"] {
        let parsed = parse(text);
        assert_eq!(parsed.name, "pr.summarize");
        assert_eq!(parsed.entities["pr_number"], 412);
    }
}

#[test]
fn parses_request_review_with_reviewer_and_pr_number() {
    let parsed = parse("request review from blair on pr 101");
    assert_eq!(parsed.name, "pr.request_review");
    assert_eq!(parsed.entities["reviewer"], "blair");
    assert_eq!(parsed.entities["pr_number"], 101);
}

#[test]
fn parses_merge_with_pr_number() {
    let parsed = parse("merge pr 412");
    assert_eq!(parsed.name, "pr.merge");
    assert_eq!(parsed.entities["pr_number"], 412);
}

#[test]
fn parses_checks_status_variants() {
    for text in ["what's the status of pr 412", "are checks passing on 412"] {
        let parsed = parse(text);
        assert_eq!(parsed.name, "checks.status");
        assert_eq!(parsed.entities["pr_number"], 412);
    }
}

#[test]
fn parses_agent_delegate_with_verbatim_instruction() {
    let parsed = parse("have an agent refactor the parser module");
    assert_eq!(parsed.name, "agent.delegate");
    assert_eq!(parsed.entities["instruction"], "refactor the parser module");
}

#[test]
fn parses_agent_progress_with_optional_task_id() {
    let parsed = parse("how's the agent doing");
    assert_eq!(parsed.name, "agent.progress");
    assert!(parsed.entities.get("task_id").is_none());

    let parsed_with_id = parse("how's the agent doing on t1");
    assert_eq!(parsed_with_id.entities["task_id"], "t1");
}

#[test]
fn parses_navigation_next() {
    assert_eq!(parse("next").name, "navigation.next");
}

#[test]
fn unrecognized_text_is_unknown() {
    let parsed = parse("what's the weather like");
    assert!(parsed.is_unknown());
}

#[test]
fn request_review_is_matched_before_generic_summarize_pattern() {
    let parsed = parse("request review from avery on pr 101");
    assert_eq!(parsed.name, "pr.request_review");
}
