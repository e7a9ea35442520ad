//! Executor behavior against the scripted session.

use std::sync::Arc;
use std::time::Duration;

use action_executor::ActionExecutor;
use coursepilot_core_types::{AutomationError, RetryPolicy, Role, Selector, TimingPolicy};
use session_adapter::{PageError, SessionPort, StubSession};

fn quick_timing() -> TimingPolicy {
    TimingPolicy {
        page_load: Duration::from_millis(10),
        element_wait: Duration::from_millis(150),
        action_delay: Duration::from_millis(10),
        submit_wait: Duration::from_millis(150),
        task_transition: Duration::from_millis(10),
        poll_interval: Duration::from_millis(20),
    }
}

fn quick_retry() -> RetryPolicy {
    RetryPolicy::new(2, Duration::from_millis(20))
}

fn editor_session() -> (Arc<StubSession>, ActionExecutor) {
    let session = Arc::new(
        StubSession::builder()
            .node("editor", "% starter code", true)
            .bind("#editor", "editor")
            .build(),
    );
    let executor = ActionExecutor::new(session.clone(), quick_retry(), &quick_timing());
    (session, executor)
}

async fn editor_handle(session: &StubSession) -> session_adapter::ElementHandle {
    session
        .query(&Selector::parse("#editor"), Role::LeftPanelEditor)
        .await
        .unwrap()
        .remove(0)
}

#[tokio::test]
async fn write_clears_prior_content_first() {
    let (session, executor) = editor_session();
    let handle = editor_handle(&session).await;

    executor.write(&handle, "x = 42;").await.unwrap();

    assert_eq!(session.text_of("editor").unwrap(), "x = 42;");
}

#[tokio::test]
async fn write_twice_is_idempotent() {
    let (session, executor) = editor_session();
    let handle = editor_handle(&session).await;

    executor.write(&handle, "y = sin(x);").await.unwrap();
    executor.write(&handle, "y = sin(x);").await.unwrap();

    // No duplication from a missed clear.
    assert_eq!(session.text_of("editor").unwrap(), "y = sin(x);");
}

#[tokio::test]
async fn write_recovers_from_a_transient_insert_failure() {
    let (session, executor) = editor_session();
    let handle = editor_handle(&session).await;

    session.fail_next("editor", "insert", PageError::Transport("socket hiccup".into()));

    executor.write(&handle, "plot(x, y)").await.unwrap();
    assert_eq!(session.text_of("editor").unwrap(), "plot(x, y)");
}

#[tokio::test]
async fn write_fails_classified_after_retries_exhaust() {
    let (session, executor) = editor_session();
    let handle = editor_handle(&session).await;

    for _ in 0..5 {
        session.fail_next("editor", "clear", PageError::Transport("still down".into()));
    }

    let err = executor.write(&handle, "x = 1;").await.unwrap_err();
    match err {
        AutomationError::ActionFailed { role, .. } => assert_eq!(role, Role::LeftPanelEditor),
        other => panic!("expected ActionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn gone_context_is_session_lost_without_retries() {
    let (session, executor) = editor_session();
    let handle = editor_handle(&session).await;

    session.fail_next("editor", "interactable", PageError::Gone("tab crashed".into()));

    let started = std::time::Instant::now();
    let err = executor.write(&handle, "x = 1;").await.unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, AutomationError::SessionLost(_)));
    // No retry delays were burned on a dead context.
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn click_waits_for_interactability() {
    let session = Arc::new(
        StubSession::builder()
            .node("submit", "Submit", false)
            .bind("#submit", "submit")
            .build(),
    );
    let executor = ActionExecutor::new(session.clone(), quick_retry(), &quick_timing());
    let handle = session
        .query(&Selector::parse("#submit"), Role::SubmitButton)
        .await
        .unwrap()
        .remove(0);

    // Becomes clickable shortly after the first probe.
    let flipper = {
        let session = session.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            session.set_interactable("submit", true);
        })
    };

    executor.click(&handle).await.unwrap();
    flipper.await.unwrap();
}

#[tokio::test]
async fn click_on_permanently_blocked_element_fails() {
    let session = Arc::new(
        StubSession::builder()
            .node("submit", "Submit", false)
            .bind("#submit", "submit")
            .build(),
    );
    let executor = ActionExecutor::new(session.clone(), quick_retry(), &quick_timing());
    let handle = session
        .query(&Selector::parse("#submit"), Role::SubmitButton)
        .await
        .unwrap()
        .remove(0);

    let err = executor.click(&handle).await.unwrap_err();
    assert!(matches!(err, AutomationError::ActionFailed { .. }));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn read_returns_panel_text() {
    let session = Arc::new(
        StubSession::builder()
            .node("solution", "x = linspace(0, 1);\ny = x.^2;", false)
            .bind(".textWrapper", "solution")
            .build(),
    );
    let executor = ActionExecutor::new(session.clone(), quick_retry(), &quick_timing());
    let handle = session
        .query(&Selector::parse(".textWrapper"), Role::RightPanelSolution)
        .await
        .unwrap()
        .remove(0);

    let text = executor.read(&handle).await.unwrap();
    assert!(text.contains("linspace"));
}
