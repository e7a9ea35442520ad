//! The action executor: read, write, click.

use std::sync::Arc;
use std::time::Duration;

use coursepilot_core_types::{ActionOp, AutomationError, RetryPolicy, Role, TimingPolicy};
use session_adapter::{ElementHandle, PageError, SessionPort};
use thiserror::Error;
use tracing::debug;

use crate::retry::run_with_retries;
use crate::waiting::poll_until;

/// Failure of a single attempt, before retry classification collapses it
/// into the task-level taxonomy.
#[derive(Debug, Error, Clone)]
enum AttemptError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error("element not ready within {0:?}")]
    NotReady(Duration),

    #[error("content read back after write did not match the input")]
    VerifyMismatch,
}

impl AttemptError {
    fn is_transient(&self) -> bool {
        match self {
            AttemptError::Page(err) => err.is_transient(),
            AttemptError::NotReady(_) | AttemptError::VerifyMismatch => true,
        }
    }
}

/// Performs single interactions against located elements.
///
/// Each operation waits for the element to be ready, then runs inside the
/// shared bounded-retry combinator. Transient causes (stale handle,
/// momentarily not interactable, transport hiccup, verify mismatch) are
/// retried; a gone browsing context fails immediately as `SessionLost`.
pub struct ActionExecutor {
    session: Arc<dyn SessionPort>,
    retry: RetryPolicy,
    ready_timeout: Duration,
    poll_interval: Duration,
}

impl ActionExecutor {
    pub fn new(session: Arc<dyn SessionPort>, retry: RetryPolicy, timing: &TimingPolicy) -> Self {
        Self {
            session,
            retry,
            ready_timeout: timing.element_wait,
            poll_interval: timing.poll_interval,
        }
    }

    /// Text content of the element. Presence was established when the
    /// handle was located; reads do not require interactability.
    pub async fn read(&self, handle: &ElementHandle) -> Result<String, AutomationError> {
        let text = run_with_retries(
            &self.retry,
            "read",
            AttemptError::is_transient,
            || async { Ok(self.session.read_text(handle).await?) },
        )
        .await
        .map_err(|err| finalize(ActionOp::Read, handle.role, err))?;

        debug!(role = %handle.role, chars = text.len(), "read element text");
        Ok(text)
    }

    /// Replace the element's content with `text`.
    ///
    /// Prior content is cleared before inserting, and the result is read
    /// back and compared under whitespace normalization before the write
    /// counts as done. Calling this twice with the same text leaves the
    /// content equal to that text.
    pub async fn write(&self, handle: &ElementHandle, text: &str) -> Result<(), AutomationError> {
        run_with_retries(&self.retry, "write", AttemptError::is_transient, || async {
            self.ensure_ready(handle).await?;
            self.session.clear_text(handle).await?;
            self.session.insert_text(handle, text).await?;
            let written = self.session.read_text(handle).await?;
            if normalize_whitespace(&written) != normalize_whitespace(text) {
                return Err(AttemptError::VerifyMismatch);
            }
            Ok(())
        })
        .await
        .map_err(|err| finalize(ActionOp::Write, handle.role, err))?;

        debug!(role = %handle.role, chars = text.len(), "wrote element content");
        Ok(())
    }

    /// Click the element once it is interactable.
    pub async fn click(&self, handle: &ElementHandle) -> Result<(), AutomationError> {
        run_with_retries(&self.retry, "click", AttemptError::is_transient, || async {
            self.ensure_ready(handle).await?;
            self.session.click(handle).await?;
            Ok(())
        })
        .await
        .map_err(|err| finalize(ActionOp::Click, handle.role, err))?;

        debug!(role = %handle.role, "clicked element");
        Ok(())
    }

    /// Precondition wait: poll until the element reports interactable.
    async fn ensure_ready(&self, handle: &ElementHandle) -> Result<(), AttemptError> {
        let ready = poll_until(self.ready_timeout, self.poll_interval, || async {
            match self.session.is_interactable(handle).await {
                Ok(true) => Ok(Some(())),
                Ok(false) => Ok(None),
                Err(err) => Err(AttemptError::from(err)),
            }
        })
        .await?;

        match ready {
            Some(()) => Ok(()),
            None => Err(AttemptError::NotReady(self.ready_timeout)),
        }
    }
}

fn finalize(op: ActionOp, role: Role, err: AttemptError) -> AutomationError {
    match err {
        AttemptError::Page(PageError::Gone(reason)) => AutomationError::SessionLost(reason),
        AttemptError::Page(PageError::Stale(_)) => AutomationError::StaleHandle { role },
        other => AutomationError::ActionFailed {
            op,
            role,
            cause: other.to_string(),
        },
    }
}

/// Collapse runs of whitespace so editors that re-indent or re-wrap the
/// injected text still verify.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_runs_and_newlines() {
        assert_eq!(
            normalize_whitespace("x = 1;\n  y   = 2;\t\nplot(x, y)"),
            "x = 1; y = 2; plot(x, y)"
        );
        assert_eq!(normalize_whitespace("  "), "");
    }

    #[test]
    fn verify_mismatch_is_transient_but_gone_is_not() {
        assert!(AttemptError::VerifyMismatch.is_transient());
        assert!(AttemptError::Page(PageError::Stale("s".into())).is_transient());
        assert!(!AttemptError::Page(PageError::Gone("g".into())).is_transient());
    }
}
