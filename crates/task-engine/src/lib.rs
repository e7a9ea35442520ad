//! The task-processing engine.
//!
//! A [`TaskProcessor`] runs one course task through the
//! locate → extract → inject → submit → verify state machine; a
//! [`BatchOrchestrator`] iterates the task list, applies the
//! continue-on-error policy and produces the [`RunReport`]. Execution is
//! strictly sequential: the browser session is a single shared mutable
//! resource and is never driven by two logical tasks at once.

pub mod events;
pub mod model;
pub mod orchestrator;
pub mod processor;
pub mod report;

pub use events::*;
pub use model::*;
pub use orchestrator::*;
pub use processor::*;
pub use report::*;
