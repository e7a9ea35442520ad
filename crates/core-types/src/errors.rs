//! Error taxonomy shared across the automation kernel.

use crate::role::{ActionOp, Role};
use thiserror::Error;

/// Terminal error classification for one automation operation.
///
/// Everything except `SessionLost` is recoverable at the task level: the
/// task is marked failed and the batch moves on when configured to.
#[derive(Debug, Error, Clone)]
pub enum AutomationError {
    /// Every selector strategy for a role exhausted its wait window.
    #[error("no element matched role '{role}' (tried: {})", .attempted.join(", "))]
    ElementNotFound { role: Role, attempted: Vec<String> },

    /// An interaction could not complete after bounded retries.
    #[error("{op} on '{role}' failed: {cause}")]
    ActionFailed {
        op: ActionOp,
        role: Role,
        cause: String,
    },

    /// Submission was dispatched but no acknowledgment appeared in time.
    /// Kept distinct from `ElementNotFound`: the write/submit may have
    /// silently succeeded server-side.
    #[error("submission dispatched but not acknowledged within the wait window")]
    SubmitUnconfirmed,

    /// An element handle from a previous DOM generation was used.
    #[error("stale handle for '{role}': page navigated since it was located")]
    StaleHandle { role: Role },

    /// The browsing context itself became unusable. Fatal for the run.
    #[error("browsing session lost: {0}")]
    SessionLost(String),

    /// Configuration rejected at load time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AutomationError {
    /// Fatal errors abort the whole run regardless of continue-on-error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AutomationError::SessionLost(_))
    }

    /// Short machine-readable reason code, used in events and the report.
    pub fn code(&self) -> &'static str {
        match self {
            AutomationError::ElementNotFound { .. } => "element-not-found",
            AutomationError::ActionFailed { .. } => "action-failed",
            AutomationError::SubmitUnconfirmed => "submit-unconfirmed",
            AutomationError::StaleHandle { .. } => "stale-handle",
            AutomationError::SessionLost(_) => "session-lost",
            AutomationError::InvalidConfig(_) => "invalid-config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_session_loss_is_fatal() {
        let lost = AutomationError::SessionLost("tab crashed".into());
        assert!(lost.is_fatal());

        let not_found = AutomationError::ElementNotFound {
            role: Role::SubmitButton,
            attempted: vec![".submit-button".into()],
        };
        assert!(!not_found.is_fatal());
        assert!(!AutomationError::SubmitUnconfirmed.is_fatal());
    }

    #[test]
    fn element_not_found_lists_attempted_selectors() {
        let err = AutomationError::ElementNotFound {
            role: Role::LeftPanelEditor,
            attempted: vec!["textarea".into(), "[contenteditable=\"true\"]".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("left-panel-editor"));
        assert!(msg.contains("textarea, [contenteditable=\"true\"]"));
    }
}
