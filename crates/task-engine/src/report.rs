//! The append-only run report.

use chrono::{DateTime, Utc};
use coursepilot_core_types::RunId;
use serde::Serialize;

use crate::model::{TaskOutcome, TaskStatus};

/// Terminal record for one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub ordinal: usize,
    pub status: TaskStatus,
    /// Skip cause or failure reason code; absent on success.
    pub reason: Option<String>,
    /// Human-readable error detail, when one exists.
    pub detail: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Finalized summary of a batch's outcomes. Records are append-only;
/// aggregates are computed once at finalization.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub records: Vec<TaskRecord>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pending: usize,
    /// Share of the course needing no further attention:
    /// (succeeded + skipped) / total.
    pub completion_pct: f64,
    /// Set when a fatal error halted the batch early.
    pub aborted: Option<String>,
}

impl RunReport {
    pub fn new(total: usize) -> Self {
        Self {
            run_id: RunId::new(),
            started_at: Utc::now(),
            finished_at: None,
            records: Vec::with_capacity(total),
            total,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            pending: 0,
            completion_pct: 0.0,
            aborted: None,
        }
    }

    pub fn record(&mut self, ordinal: usize, outcome: &TaskOutcome) {
        let (reason, detail) = match outcome {
            TaskOutcome::Succeeded => (None, None),
            TaskOutcome::Skipped(cause) => (Some(cause.as_str().to_string()), None),
            TaskOutcome::Failed { reason, detail } => (Some(reason.clone()), detail.clone()),
        };
        self.records.push(TaskRecord {
            ordinal,
            status: outcome.status(),
            reason,
            detail,
            recorded_at: Utc::now(),
        });
    }

    /// Record a task the run never reached.
    pub fn record_pending(&mut self, ordinal: usize) {
        self.records.push(TaskRecord {
            ordinal,
            status: TaskStatus::Pending,
            reason: None,
            detail: None,
            recorded_at: Utc::now(),
        });
    }

    pub fn abort(&mut self, reason: impl Into<String>) {
        self.aborted = Some(reason.into());
    }

    /// Compute aggregates and stamp the finish time.
    pub fn finalize(&mut self) {
        self.succeeded = self.count(TaskStatus::Succeeded);
        self.failed = self.count(TaskStatus::Failed);
        self.skipped = self.count(TaskStatus::Skipped);
        self.pending = self.count(TaskStatus::Pending);
        self.completion_pct = if self.total == 0 {
            100.0
        } else {
            (self.succeeded + self.skipped) as f64 * 100.0 / self.total as f64
        };
        self.finished_at = Some(Utc::now());
    }

    pub fn status_of(&self, ordinal: usize) -> Option<TaskStatus> {
        self.records
            .iter()
            .find(|r| r.ordinal == ordinal)
            .map(|r| r.status)
    }

    fn count(&self, status: TaskStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }
}
