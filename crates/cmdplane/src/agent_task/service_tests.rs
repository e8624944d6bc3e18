use super::*;

#[tokio::test]
async fn mock_dispatch_leaves_task_running_pending_correlation() {
    let service = AgentTaskService::new("org/dispatch".to_owned());
    let task = service.create("u1", "mock", "refactor the parser").await;
    let dispatched = service.dispatch(task.id).await.unwrap();
    assert_eq!(dispatched.state, AgentTaskState::Running);
}

#[tokio::test]
async fn mock_dispatch_correlates_via_metadata_comment() {
    let service = AgentTaskService::new("org/dispatch".to_owned());
    let task = service.create("u1", "mock", "refactor the parser").await;
    service.dispatch(task.id).await.unwrap();

    let body = format!(
        "Done.\n\n<!-- agent_task_metadata {{\"task_id\":\"{}\"}} -->",
        task.id
    );
    let completed = service.try_correlate(&body, "https://example.com/pr/42").await.unwrap();
    assert_eq!(completed.state, AgentTaskState::Completed);
}

#[tokio::test]
async fn github_dispatch_leaves_task_running() {
    let service = AgentTaskService::new("org/dispatch".to_owned());
    let task = service.create("u1", "github_issue_dispatch", "fix the bug").await;
    let dispatched = service.dispatch(task.id).await.unwrap();
    assert_eq!(dispatched.state, AgentTaskState::Running);
}

#[tokio::test]
async fn correlate_via_metadata_comment_completes_running_task() {
    let service = AgentTaskService::new("org/dispatch".to_owned());
    let task = service.create("u1", "github_issue_dispatch", "fix the bug").await;
    service.dispatch(task.id).await.unwrap();

    let body = format!(
        "Closes the issue.\n\n<!-- agent_task_metadata {{\"task_id\":\"{}\"}} -->",
        task.id
    );
    let completed = service.try_correlate(&body, "https://example.com/pr/9").await.unwrap();
    assert_eq!(completed.state, AgentTaskState::Completed);
    assert_eq!(completed.trace.get("pr_url").unwrap(), "https://example.com/pr/9");
}

#[tokio::test]
async fn correlate_via_fixes_reference_resolves_against_dispatch_repo() {
    let service = AgentTaskService::new("org/dispatch".to_owned());
    let task = service.create("u1", "github_issue_dispatch", "fix the bug").await;
    service.dispatch(task.id).await.unwrap();

    let body = "Fixes org/dispatch#1";
    let completed = service.try_correlate(body, "https://example.com/pr/9").await;
    assert!(completed.is_some());
}

#[tokio::test]
async fn correlate_ignores_unrelated_body() {
    let service = AgentTaskService::new("org/dispatch".to_owned());
    let task = service.create("u1", "github_issue_dispatch", "fix the bug").await;
    service.dispatch(task.id).await.unwrap();

    let result = service.try_correlate("nothing to see here", "https://example.com/pr/9").await;
    assert!(result.is_none());
    assert_eq!(service.get(task.id).await.unwrap().state, AgentTaskState::Running);
}

#[tokio::test]
async fn correlate_does_not_recomplete_already_completed_task() {
    let service = AgentTaskService::new("org/dispatch".to_owned());
    let task = service.create("u1", "mock", "do the thing").await;
    service.dispatch(task.id).await.unwrap();

    let body = format!("<!-- agent_task_metadata {{\"task_id\":\"{}\"}} -->", task.id);
    let first = service.try_correlate(&body, "https://example.com/pr/1").await;
    assert_eq!(first.unwrap().state, AgentTaskState::Completed);

    let second = service.try_correlate(&body, "https://example.com/pr/2").await;
    assert!(second.is_none());
    assert_eq!(
        service.get(task.id).await.unwrap().trace.get("pr_url").unwrap(),
        "https://example.com/pr/1"
    );
}
