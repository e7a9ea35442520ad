//! Task descriptors, states and outcomes.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Lifecycle status of one task within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Skipped
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        }
    }
}

/// One unit of course work tracked through the processing state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// 1-based position in the course's task list. Ordering is
    /// significant: tasks depend on sequential navigation.
    pub ordinal: usize,
    /// Optional navigable locator (URL fragment or in-page anchor). When
    /// absent the task is reached through in-page controls.
    pub target: Option<String>,
    pub status: TaskStatus,
}

impl TaskDescriptor {
    pub fn new(ordinal: usize) -> Self {
        Self {
            ordinal,
            target: None,
            status: TaskStatus::Pending,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Statuses only move forward: Pending → InProgress → terminal.
    /// Illegal transitions are dropped rather than applied.
    pub fn advance(&mut self, next: TaskStatus) {
        let legal = matches!(
            (self.status, next),
            (TaskStatus::Pending, TaskStatus::InProgress)
        ) || (self.status == TaskStatus::InProgress && next.is_terminal());

        if legal {
            self.status = next;
        } else {
            warn!(
                task = self.ordinal,
                from = self.status.name(),
                to = next.name(),
                "ignoring backward task status transition"
            );
        }
    }
}

/// Why a task was skipped rather than processed. Kept distinguishable so
/// a data-extraction failure cannot hide behind an already-finished task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipCause {
    /// The solution panel read back empty.
    SolutionEmpty,
    /// The panel carries an explicit no-solution marker.
    SolutionUnavailable,
    /// A success indicator was visible before any interaction.
    AlreadyCompleted,
}

impl SkipCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipCause::SolutionEmpty => "solution-empty",
            SkipCause::SolutionUnavailable => "solution-unavailable",
            SkipCause::AlreadyCompleted => "already-completed",
        }
    }
}

/// Terminal outcome of processing one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Skipped(SkipCause),
    Failed {
        reason: String,
        detail: Option<String>,
    },
}

impl TaskOutcome {
    pub fn failed(reason: impl Into<String>, detail: impl Into<String>) -> Self {
        TaskOutcome::Failed {
            reason: reason.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            TaskOutcome::Succeeded => TaskStatus::Succeeded,
            TaskOutcome::Skipped(_) => TaskStatus::Skipped,
            TaskOutcome::Failed { .. } => TaskStatus::Failed,
        }
    }
}

/// States of the per-task machine, in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Start,
    Located,
    Extracted,
    Injected,
    Submitted,
    Verified,
    Done,
}

impl TaskState {
    pub fn name(&self) -> &'static str {
        match self {
            TaskState::Start => "start",
            TaskState::Located => "located",
            TaskState::Extracted => "extracted",
            TaskState::Injected => "injected",
            TaskState::Submitted => "submitted",
            TaskState::Verified => "verified",
            TaskState::Done => "done",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
