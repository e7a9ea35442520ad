//! Fallback-chain element resolution against the live session.

use std::sync::Arc;
use std::time::Duration;

use action_executor::poll_until;
use coursepilot_core_types::{AutomationError, Role, Selector, TimingPolicy};
use session_adapter::{ElementHandle, PageError, SessionPort};
use tracing::{debug, warn};

use crate::SelectorBook;

/// Resolves semantic roles to live element handles.
pub struct ElementLocator {
    session: Arc<dyn SessionPort>,
    book: SelectorBook,
    poll_interval: Duration,
}

impl ElementLocator {
    pub fn new(
        session: Arc<dyn SessionPort>,
        book: SelectorBook,
        timing: &TimingPolicy,
    ) -> Self {
        Self {
            session,
            book,
            poll_interval: timing.poll_interval,
        }
    }

    /// Resolve `role` within `timeout`.
    ///
    /// Strategies are tried in configured order; each candidate gets an
    /// equal share of the total budget as its own wait window and is
    /// polled at a fixed interval. The first match wins and later
    /// candidates are never consulted. Interactive roles additionally
    /// require the element to be interactable, not merely present.
    pub async fn locate(
        &self,
        role: Role,
        timeout: Duration,
    ) -> Result<ElementHandle, AutomationError> {
        let selectors = self.book.selectors(role);
        let window = candidate_window(timeout, selectors.len(), self.poll_interval);
        let mut attempted = Vec::with_capacity(selectors.len());

        for selector in selectors {
            attempted.push(selector.expression().to_string());
            debug!(%role, selector = %selector, ?window, "trying selector strategy");

            let found = poll_until(window, self.poll_interval, || async {
                self.probe(selector, role).await
            })
            .await
            .map_err(map_probe_error)?;

            if let Some(handle) = found {
                debug!(%role, selector = %selector, "resolved element");
                return Ok(handle);
            }
        }

        warn!(%role, tried = attempted.len(), "all selector strategies exhausted");
        Err(AutomationError::ElementNotFound { role, attempted })
    }

    /// Single non-waiting probe over the whole chain. Used for optional
    /// controls (a submit button that some task types simply lack) and
    /// for indicators that are either already visible or not coming.
    pub async fn peek(&self, role: Role) -> Result<Option<ElementHandle>, AutomationError> {
        for selector in self.book.selectors(role) {
            if let Some(handle) = self.probe(selector, role).await.map_err(map_probe_error)? {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }

    /// All current matches for `role`, without waiting: the first strategy
    /// yielding a non-empty set wins. Used to enumerate the task list.
    pub async fn locate_all(&self, role: Role) -> Result<Vec<ElementHandle>, AutomationError> {
        for selector in self.book.selectors(role) {
            match self.session.query(selector, role).await {
                Ok(handles) if !handles.is_empty() => {
                    debug!(%role, selector = %selector, count = handles.len(), "enumerated elements");
                    return Ok(handles);
                }
                Ok(_) => {}
                Err(err) if err.is_transient() => {
                    debug!(%role, selector = %selector, %err, "query failed, trying next strategy");
                }
                Err(err) => return Err(map_probe_error(err)),
            }
        }
        Ok(Vec::new())
    }

    /// One presence (and, for interactive roles, interactability) check.
    /// Transient query errors read as "not there yet" so polling
    /// continues; only a dead context aborts the wait.
    async fn probe(
        &self,
        selector: &Selector,
        role: Role,
    ) -> Result<Option<ElementHandle>, PageError> {
        let handles = match self.session.query(selector, role).await {
            Ok(handles) => handles,
            Err(err) if err.is_transient() => return Ok(None),
            Err(err) => return Err(err),
        };

        for handle in handles {
            if !role.is_interactive() {
                return Ok(Some(handle));
            }
            match self.session.is_interactable(&handle).await {
                Ok(true) => return Ok(Some(handle)),
                Ok(false) => {}
                Err(err) if err.is_transient() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }
}

/// Split the total budget evenly across candidates, floored at one poll
/// interval so every strategy gets at least a single probe's worth.
fn candidate_window(total: Duration, candidates: usize, interval: Duration) -> Duration {
    if candidates == 0 {
        return Duration::ZERO;
    }
    std::cmp::max(total / candidates as u32, interval)
}

fn map_probe_error(err: PageError) -> AutomationError {
    match err {
        PageError::Gone(reason) => AutomationError::SessionLost(reason),
        other => AutomationError::SessionLost(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_splits_budget_evenly() {
        let interval = Duration::from_millis(250);
        assert_eq!(
            candidate_window(Duration::from_secs(2), 1, interval),
            Duration::from_secs(2)
        );
        assert_eq!(
            candidate_window(Duration::from_secs(2), 4, interval),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn window_never_drops_below_one_interval() {
        let interval = Duration::from_millis(250);
        assert_eq!(
            candidate_window(Duration::from_millis(100), 4, interval),
            interval
        );
        assert_eq!(candidate_window(Duration::from_secs(1), 0, interval), Duration::ZERO);
    }
}
