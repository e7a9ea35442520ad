//! Configuration loading and validation.
//!
//! Defaults match the documented course deployment; a JSON file and a
//! handful of `COURSEPILOT_*` environment variables override them.
//! Selector overrides are validated into the closed role set at load
//! time, so configuration mistakes fail before a run starts.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use coursepilot_core_types::{AutomationError, RetryPolicy, TimingPolicy};
use element_locator::SelectorBook;
use serde::{Deserialize, Serialize};
use task_engine::EngineConfig;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Role name → ordered selector expressions. Each entry replaces the
    /// built-in list for that role.
    pub selectors: HashMap<String, Vec<String>>,
    pub timing: TimingSection,
    pub error_handling: ErrorHandlingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingSection {
    pub page_load_ms: u64,
    pub element_wait_ms: u64,
    pub action_delay_ms: u64,
    pub submit_wait_ms: u64,
    pub task_transition_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            page_load_ms: 3000,
            element_wait_ms: 2000,
            action_delay_ms: 1000,
            submit_wait_ms: 3000,
            task_transition_ms: 2000,
            poll_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorHandlingSection {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub continue_on_error: bool,
    pub screenshot_on_error: bool,
    pub screenshot_on_skip: bool,
}

impl Default for ErrorHandlingSection {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 2000,
            continue_on_error: true,
            screenshot_on_error: true,
            screenshot_on_skip: false,
        }
    }
}

impl AppConfig {
    /// Load from an optional JSON file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, AutomationError> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|err| {
                    AutomationError::InvalidConfig(format!(
                        "cannot read {}: {err}",
                        path.display()
                    ))
                })?;
                serde_json::from_str(&content).map_err(|err| {
                    AutomationError::InvalidConfig(format!(
                        "cannot parse {}: {err}",
                        path.display()
                    ))
                })?
            }
            None => AppConfig::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("COURSEPILOT_CONTINUE_ON_ERROR") {
            if let Ok(flag) = value.parse() {
                debug!(flag, "continue_on_error overridden from environment");
                self.error_handling.continue_on_error = flag;
            }
        }
        if let Ok(value) = std::env::var("COURSEPILOT_MAX_RETRIES") {
            if let Ok(retries) = value.parse() {
                self.error_handling.max_retries = retries;
            }
        }
        if let Ok(value) = std::env::var("COURSEPILOT_ELEMENT_WAIT_MS") {
            if let Ok(ms) = value.parse() {
                self.timing.element_wait_ms = ms;
            }
        }
    }

    /// Validate selector overrides into the closed role set.
    pub fn selector_book(&self) -> Result<SelectorBook, AutomationError> {
        SelectorBook::course_defaults().with_overrides(&self.selectors)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            timing: TimingPolicy {
                page_load: Duration::from_millis(self.timing.page_load_ms),
                element_wait: Duration::from_millis(self.timing.element_wait_ms),
                action_delay: Duration::from_millis(self.timing.action_delay_ms),
                submit_wait: Duration::from_millis(self.timing.submit_wait_ms),
                task_transition: Duration::from_millis(self.timing.task_transition_ms),
                poll_interval: Duration::from_millis(self.timing.poll_interval_ms),
            },
            retry: RetryPolicy::new(
                self.error_handling.max_retries,
                Duration::from_millis(self.error_handling.retry_delay_ms),
            ),
            continue_on_error: self.error_handling.continue_on_error,
            screenshot_on_error: self.error_handling.screenshot_on_error,
            screenshot_on_skip: self.error_handling.screenshot_on_skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursepilot_core_types::Role;

    #[test]
    fn defaults_mirror_the_documented_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.timing.element_wait_ms, 2000);
        assert_eq!(config.error_handling.max_retries, 3);
        assert!(config.error_handling.continue_on_error);
        assert!(config.selector_book().is_ok());
    }

    #[test]
    fn json_round_trip_overrides_sections() {
        let raw = r##"{
            "selectors": { "submit-button": ["#run"] },
            "timing": { "element_wait_ms": 500 },
            "error_handling": { "continue_on_error": false }
        }"##;
        let config: AppConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.timing.element_wait_ms, 500);
        // Untouched fields keep their defaults.
        assert_eq!(config.timing.submit_wait_ms, 3000);
        assert!(!config.error_handling.continue_on_error);

        let book = config.selector_book().unwrap();
        assert_eq!(book.selectors(Role::SubmitButton).len(), 1);
    }

    #[test]
    fn unknown_selector_role_fails_at_load() {
        let raw = r#"{ "selectors": { "midle-panel": [".x"] } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        let err = config.selector_book().unwrap_err();
        assert!(err.to_string().contains("midle-panel"));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let raw = r#"{ "timings": {} }"#;
        assert!(serde_json::from_str::<AppConfig>(raw).is_err());
    }

    #[test]
    fn engine_config_converts_durations() {
        let config = AppConfig::default();
        let engine = config.engine_config();
        assert_eq!(engine.timing.element_wait, Duration::from_secs(2));
        assert_eq!(engine.retry.retry_delay, Duration::from_secs(2));
        assert_eq!(engine.retry.total_attempts(), 4);
    }
}
