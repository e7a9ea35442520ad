//! Observability sink boundary.
//!
//! The engine emits structured events; persisting them (console, file,
//! anything else) is the sink's business, never the engine's.

use async_trait::async_trait;
use serde::Serialize;

use crate::model::TaskState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One structured engine event.
#[derive(Debug, Clone, Serialize)]
pub struct RunEvent {
    pub level: EventLevel,
    /// Ordinal of the task the event belongs to; 0 for run-level events.
    pub task: usize,
    pub state: TaskState,
    pub message: String,
}

impl RunEvent {
    pub fn new(level: EventLevel, task: usize, state: TaskState, message: impl Into<String>) -> Self {
        Self {
            level,
            task,
            state,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: RunEvent);
}

/// Default sink: forwards events to the `tracing` subscriber.
pub struct TracingSink;

#[async_trait]
impl EventSink for TracingSink {
    async fn emit(&self, event: RunEvent) {
        let task = event.task;
        let state = event.state.name();
        match event.level {
            EventLevel::Debug => tracing::debug!(task, state, "{}", event.message),
            EventLevel::Info => tracing::info!(task, state, "{}", event.message),
            EventLevel::Warn => tracing::warn!(task, state, "{}", event.message),
            EventLevel::Error => tracing::error!(task, state, "{}", event.message),
        }
    }
}
