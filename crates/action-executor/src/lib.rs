//! Interaction primitives for located elements.
//!
//! Wraps every read/write/click against the session with wait-for-ready
//! preconditions and the shared bounded-retry combinator, so flaky UI
//! timing never leaks past this layer as anything other than a classified
//! error.

pub mod executor;
pub mod retry;
pub mod waiting;

pub use executor::*;
pub use retry::*;
pub use waiting::*;
