//! Timing and retry policies consumed throughout the kernel.

use std::time::Duration;

/// Per-operation wait windows. Timeouts are per operation, never global,
/// so a stuck element cannot stall the whole run indefinitely.
#[derive(Debug, Clone)]
pub struct TimingPolicy {
    /// Settle time after a navigation before touching the page.
    pub page_load: Duration,
    /// Total wait budget for resolving one role.
    pub element_wait: Duration,
    /// Pause after a mutating interaction before the next step.
    pub action_delay: Duration,
    /// Wait window for the post-submit acknowledgment.
    pub submit_wait: Duration,
    /// Pause between two tasks in a batch.
    pub task_transition: Duration,
    /// Fixed interval between presence probes while waiting.
    pub poll_interval: Duration,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            page_load: Duration::from_secs(3),
            element_wait: Duration::from_secs(2),
            action_delay: Duration::from_secs(1),
            submit_wait: Duration::from_secs(3),
            task_transition: Duration::from_secs(2),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Bounded-attempt policy shared by element waits, single interactions and
/// whole-task recovery.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries on top of the first attempt.
    pub max_retries: u32,
    /// Pause between attempts.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    /// Total attempts including the initial one.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy_counts_initial_attempt() {
        assert_eq!(RetryPolicy::default().total_attempts(), 4);
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).total_attempts(), 1);
    }
}
