//! Full wiring smoke test: configuration → orchestrator → report.

use std::sync::Arc;

use coursepilot_cli::AppConfig;
use session_adapter::StubSession;
use task_engine::{BatchOrchestrator, TaskStatus, TracingSink};
use tokio_util::sync::CancellationToken;

fn quick_app_config() -> AppConfig {
    let raw = r#"{
        "timing": {
            "page_load_ms": 5,
            "element_wait_ms": 120,
            "action_delay_ms": 5,
            "submit_wait_ms": 120,
            "task_transition_ms": 5,
            "poll_interval_ms": 15
        },
        "error_handling": { "retry_delay_ms": 10 }
    }"#;
    serde_json::from_str(raw).unwrap()
}

#[tokio::test]
async fn rehearsal_flow_completes_and_reports() {
    let config = quick_app_config();
    let session = Arc::new(StubSession::course_fixture(2));

    let orchestrator = BatchOrchestrator::new(
        session,
        config.selector_book().unwrap(),
        config.engine_config(),
        Arc::new(TracingSink),
    );

    let mut tasks = orchestrator.discover_tasks(None).await.unwrap();
    assert_eq!(tasks.len(), 2);

    let report = orchestrator.run(&mut tasks, &CancellationToken::new()).await;
    assert_eq!(report.succeeded, 2);
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Succeeded));

    // The report is plain JSON for interop.
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["succeeded"], 2);
    assert_eq!(json["records"][0]["status"], "succeeded");
}

#[tokio::test]
async fn task_limit_caps_the_batch() {
    let config = quick_app_config();
    let session = Arc::new(StubSession::course_fixture(4));

    let orchestrator = BatchOrchestrator::new(
        session,
        config.selector_book().unwrap(),
        config.engine_config(),
        Arc::new(TracingSink),
    );

    let mut tasks = orchestrator.discover_tasks(Some(2)).await.unwrap();
    let report = orchestrator.run(&mut tasks, &CancellationToken::new()).await;

    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 2);
}

#[test]
fn config_file_loads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coursepilot.json");
    std::fs::write(
        &path,
        r##"{ "selectors": { "submit-button": ["#run-button"] } }"##,
    )
    .unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert!(config.selector_book().is_ok());

    std::fs::write(&path, r##"{ "selectors": { "sbmit-button": ["#run"] } }"##).unwrap();
    let config = AppConfig::load(Some(&path)).unwrap();
    assert!(config.selector_book().is_err());
}
