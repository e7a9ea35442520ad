//! Batch orchestration over the task list.

use std::sync::Arc;

use action_executor::ActionExecutor;
use coursepilot_core_types::{AutomationError, Role};
use element_locator::{ElementLocator, SelectorBook};
use session_adapter::SessionPort;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::EventSink;
use crate::model::{TaskDescriptor, TaskOutcome, TaskStatus};
use crate::processor::{EngineConfig, TaskProcessor};
use crate::report::RunReport;

/// Iterates the task list in order, drives the [`TaskProcessor`] per
/// task, applies the continue-on-error policy and produces the run
/// report. Owns the wiring of locator and executor around the borrowed
/// session; never tears the session down, so the page stays open for
/// manual post-run inspection.
pub struct BatchOrchestrator {
    locator: Arc<ElementLocator>,
    executor: Arc<ActionExecutor>,
    processor: TaskProcessor,
    config: EngineConfig,
}

impl BatchOrchestrator {
    pub fn new(
        session: Arc<dyn SessionPort>,
        book: SelectorBook,
        config: EngineConfig,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let locator = Arc::new(ElementLocator::new(
            session.clone(),
            book,
            &config.timing,
        ));
        let executor = Arc::new(ActionExecutor::new(
            session.clone(),
            config.retry.clone(),
            &config.timing,
        ));
        let processor = TaskProcessor::new(
            session,
            locator.clone(),
            executor.clone(),
            sink,
            config.clone(),
        );
        Self {
            locator,
            executor,
            processor,
            config,
        }
    }

    /// Enumerate the course's task list into descriptors, optionally
    /// capped at `limit` entries.
    pub async fn discover_tasks(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<TaskDescriptor>, AutomationError> {
        let handles = self.locator.locate_all(Role::TaskItem).await?;
        let mut tasks: Vec<TaskDescriptor> =
            (1..=handles.len()).map(TaskDescriptor::new).collect();
        if let Some(limit) = limit {
            tasks.truncate(limit);
        }
        info!(found = handles.len(), running = tasks.len(), "enumerated task list");
        Ok(tasks)
    }

    /// Run the batch. Descriptors are finalized in place; the returned
    /// report always carries one record per task, attempted or not.
    pub async fn run(
        &self,
        tasks: &mut [TaskDescriptor],
        cancel: &CancellationToken,
    ) -> RunReport {
        let total = tasks.len();
        let mut report = RunReport::new(total);

        for index in 0..total {
            if cancel.is_cancelled() {
                warn!("run cancelled, leaving remaining tasks pending");
                break;
            }

            let task = &mut tasks[index];
            task.advance(TaskStatus::InProgress);

            match self.processor.process(task).await {
                Ok(outcome) => {
                    task.advance(outcome.status());
                    report.record(task.ordinal, &outcome);

                    let failed = matches!(outcome, TaskOutcome::Failed { .. });
                    if failed && !self.config.continue_on_error {
                        warn!(task = task.ordinal, "stopping batch after first failure");
                        break;
                    }
                }
                Err(fatal) => {
                    task.advance(TaskStatus::Failed);
                    report.record(
                        task.ordinal,
                        &TaskOutcome::failed(fatal.code(), fatal.to_string()),
                    );
                    report.abort(fatal.to_string());
                    warn!(task = task.ordinal, %fatal, "aborting batch");
                    break;
                }
            }

            if index + 1 < total {
                self.advance_to_next().await;
            }
        }

        for task in tasks.iter().filter(|t| t.status == TaskStatus::Pending) {
            report.record_pending(task.ordinal);
        }
        report.finalize();
        report
    }

    /// Best-effort move to the next task. Courses that navigate through
    /// an explicit control get it clicked; everything else just gets the
    /// transition pause.
    async fn advance_to_next(&self) {
        match self.locator.peek(Role::NextTaskButton).await {
            Ok(Some(next)) => {
                if let Err(err) = self.executor.click(&next).await {
                    warn!(%err, "could not activate next-task control");
                }
            }
            Ok(None) => debug!("no next-task control present"),
            Err(err) => warn!(%err, "next-task probe failed"),
        }
        sleep(self.config.timing.task_transition).await;
    }
}
