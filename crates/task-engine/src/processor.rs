//! The per-task state machine.

use std::sync::Arc;

use action_executor::{poll_until, ActionExecutor};
use coursepilot_core_types::{ActionOp, AutomationError, RetryPolicy, Role, TimingPolicy};
use element_locator::ElementLocator;
use session_adapter::{PageError, SessionPort};
use tokio::time::sleep;
use tracing::instrument;

use crate::events::{EventLevel, EventSink, RunEvent};
use crate::model::{SkipCause, TaskDescriptor, TaskOutcome, TaskState};

/// Panel texts that mean "there is nothing to extract here", checked
/// case-insensitively against the extracted content.
const NO_SOLUTION_MARKERS: [&str; 3] = [
    "no solution available",
    "solution unavailable",
    "solution is not available",
];

/// Engine-wide knobs shared by the processor and the orchestrator.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub timing: TimingPolicy,
    pub retry: RetryPolicy,
    pub continue_on_error: bool,
    pub screenshot_on_error: bool,
    pub screenshot_on_skip: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timing: TimingPolicy::default(),
            retry: RetryPolicy::default(),
            continue_on_error: true,
            screenshot_on_error: true,
            screenshot_on_skip: false,
        }
    }
}

/// Sequences locate → extract → inject → submit → verify for one task and
/// classifies the outcome.
///
/// Panels are rebound on every run: navigation changes DOM identity, so
/// no handle survives from a previous task. Expected step failures
/// (panel-not-found, submit-unconfirmed, the skip cases) finalize the
/// task; other automation errors trigger a bounded whole-task retry;
/// session loss propagates to the orchestrator.
pub struct TaskProcessor {
    session: Arc<dyn SessionPort>,
    locator: Arc<ElementLocator>,
    executor: Arc<ActionExecutor>,
    sink: Arc<dyn EventSink>,
    config: EngineConfig,
}

impl TaskProcessor {
    pub fn new(
        session: Arc<dyn SessionPort>,
        locator: Arc<ElementLocator>,
        executor: Arc<ActionExecutor>,
        sink: Arc<dyn EventSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            session,
            locator,
            executor,
            sink,
            config,
        }
    }

    /// Process one task to a terminal outcome.
    ///
    /// `Err` is returned only for fatal session loss; every other path
    /// resolves to an outcome.
    #[instrument(skip_all, fields(task = task.ordinal))]
    pub async fn process(&self, task: &TaskDescriptor) -> Result<TaskOutcome, AutomationError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.run_once(task).await {
                Ok(outcome) => {
                    self.finish(task, &outcome).await;
                    return Ok(outcome);
                }
                Err(err) if err.is_fatal() => {
                    self.emit(
                        EventLevel::Error,
                        task.ordinal,
                        TaskState::Done,
                        format!("fatal error: {err}"),
                    )
                    .await;
                    return Err(err);
                }
                Err(err) if attempt < self.config.retry.total_attempts() => {
                    self.emit(
                        EventLevel::Warn,
                        task.ordinal,
                        TaskState::Start,
                        format!(
                            "attempt {attempt}/{} failed ({err}), retrying whole task",
                            self.config.retry.total_attempts()
                        ),
                    )
                    .await;
                    sleep(self.config.retry.retry_delay).await;
                }
                Err(err) => {
                    let outcome =
                        TaskOutcome::failed(err.code(), err.to_string());
                    self.finish(task, &outcome).await;
                    return Ok(outcome);
                }
            }
        }
    }

    /// One traversal of the state machine.
    async fn run_once(&self, task: &TaskDescriptor) -> Result<TaskOutcome, AutomationError> {
        let timing = &self.config.timing;
        let n = task.ordinal;

        self.emit(EventLevel::Info, n, TaskState::Start, "processing task")
            .await;

        // Start → Located. Panels are rebound for the current task
        // context; a navigation target invalidates all prior handles.
        if let Some(target) = &task.target {
            self.session
                .navigate(target)
                .await
                .map_err(navigation_error)?;
            sleep(timing.page_load).await;
        }

        if self.locator.peek(Role::SuccessIndicator).await?.is_some() {
            self.emit(
                EventLevel::Info,
                n,
                TaskState::Start,
                "success indicator already visible, skipping task",
            )
            .await;
            return Ok(TaskOutcome::Skipped(SkipCause::AlreadyCompleted));
        }

        let editor = match self.locator.locate(Role::LeftPanelEditor, timing.element_wait).await {
            Ok(handle) => handle,
            Err(err @ AutomationError::ElementNotFound { .. }) => {
                return Ok(TaskOutcome::failed("panel-not-found", err.to_string()))
            }
            Err(err) => return Err(err),
        };
        let solution = match self
            .locator
            .locate(Role::RightPanelSolution, timing.element_wait)
            .await
        {
            Ok(handle) => handle,
            Err(err @ AutomationError::ElementNotFound { .. }) => {
                return Ok(TaskOutcome::failed("panel-not-found", err.to_string()))
            }
            Err(err) => return Err(err),
        };
        self.emit(EventLevel::Info, n, TaskState::Located, "panels bound")
            .await;

        // Located → Extracted. Some course layouts hide the solution
        // behind a reveal control; its absence is not an error.
        if let Some(reveal) = self.locator.peek(Role::SeeSolutionButton).await? {
            self.executor.click(&reveal).await?;
            sleep(timing.action_delay).await;
        }

        let text = self.executor.read(&solution).await?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.emit(
                EventLevel::Warn,
                n,
                TaskState::Extracted,
                "solution panel is empty, skipping task",
            )
            .await;
            return Ok(TaskOutcome::Skipped(SkipCause::SolutionEmpty));
        }
        let lowered = trimmed.to_lowercase();
        if NO_SOLUTION_MARKERS.iter().any(|m| lowered.contains(m)) {
            self.emit(
                EventLevel::Warn,
                n,
                TaskState::Extracted,
                "no solution provided for this task, skipping",
            )
            .await;
            return Ok(TaskOutcome::Skipped(SkipCause::SolutionUnavailable));
        }
        self.emit(
            EventLevel::Info,
            n,
            TaskState::Extracted,
            format!("extracted {} chars of solution content", text.len()),
        )
        .await;

        // Extracted → Injected.
        self.executor.write(&editor, &text).await?;
        self.emit(EventLevel::Info, n, TaskState::Injected, "solution injected")
            .await;
        sleep(timing.action_delay).await;

        // Injected → Submitted → Verified. Task types without a submit
        // control go straight to verified.
        match self.locator.peek(Role::SubmitButton).await? {
            None => {
                self.emit(
                    EventLevel::Info,
                    n,
                    TaskState::Verified,
                    "no submit control for this task type",
                )
                .await;
                Ok(TaskOutcome::Succeeded)
            }
            Some(submit) => {
                self.executor.click(&submit).await?;
                self.emit(EventLevel::Info, n, TaskState::Submitted, "submission dispatched")
                    .await;

                let acknowledged = poll_until(timing.submit_wait, timing.poll_interval, || async {
                    self.locator.peek(Role::SuccessIndicator).await
                })
                .await?;

                match acknowledged {
                    Some(_) => {
                        self.emit(
                            EventLevel::Info,
                            n,
                            TaskState::Verified,
                            "submission acknowledged",
                        )
                        .await;
                        Ok(TaskOutcome::Succeeded)
                    }
                    // The submit may have silently succeeded server-side;
                    // a missing acknowledgment is a failed task, not a
                    // crashed run.
                    None => Ok(TaskOutcome::failed(
                        "submit-unconfirmed",
                        AutomationError::SubmitUnconfirmed.to_string(),
                    )),
                }
            }
        }
    }

    /// Terminal hooks: event emission and screenshot capture.
    async fn finish(&self, task: &TaskDescriptor, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Succeeded => {
                self.emit(EventLevel::Info, task.ordinal, TaskState::Done, "task succeeded")
                    .await;
            }
            TaskOutcome::Skipped(cause) => {
                self.emit(
                    EventLevel::Info,
                    task.ordinal,
                    TaskState::Done,
                    format!("task skipped: {}", cause.as_str()),
                )
                .await;
                if self.config.screenshot_on_skip {
                    self.screenshot(task.ordinal, cause.as_str()).await;
                }
            }
            TaskOutcome::Failed { reason, detail } => {
                self.emit(
                    EventLevel::Error,
                    task.ordinal,
                    TaskState::Done,
                    format!(
                        "task failed: {reason}{}",
                        detail
                            .as_deref()
                            .map(|d| format!(" ({d})"))
                            .unwrap_or_default()
                    ),
                )
                .await;
                if self.config.screenshot_on_error {
                    self.screenshot(task.ordinal, reason).await;
                }
            }
        }
    }

    /// Best effort: a dead session must not turn a hook into a crash.
    async fn screenshot(&self, ordinal: usize, label: &str) {
        let label = format!("task_{ordinal}_{label}");
        if let Err(err) = self.session.capture_screenshot(&label).await {
            tracing::warn!(%label, %err, "screenshot capture failed");
        }
    }

    async fn emit(&self, level: EventLevel, task: usize, state: TaskState, message: impl Into<String>) {
        self.sink
            .emit(RunEvent::new(level, task, state, message))
            .await;
    }
}

fn navigation_error(err: PageError) -> AutomationError {
    match err {
        PageError::Gone(reason) => AutomationError::SessionLost(reason),
        other => AutomationError::ActionFailed {
            op: ActionOp::Navigate,
            role: Role::TaskItem,
            cause: other.to_string(),
        },
    }
}
