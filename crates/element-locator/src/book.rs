//! Selector strategy configuration.

use std::collections::HashMap;

use coursepilot_core_types::{AutomationError, Role, Selector};

/// Immutable map from role to its ordered selector strategies.
///
/// Built once at configuration-load time and only consulted afterwards.
/// Unknown role names or empty strategy lists are rejected while loading,
/// never mid-run.
#[derive(Debug, Clone)]
pub struct SelectorBook {
    entries: HashMap<Role, Vec<Selector>>,
}

impl SelectorBook {
    /// Built-in strategies for the documented dual-panel course layout.
    pub fn course_defaults() -> Self {
        let mut entries = HashMap::new();

        entries.insert(
            Role::LeftPanelEditor,
            parse_all(&[
                "#documentContainerTabContainer0 textarea",
                ".editorWindow.liveCode textarea",
                ".CodeMirror textarea",
                "[contenteditable=\"true\"]",
            ]),
        );
        entries.insert(
            Role::RightPanelSolution,
            parse_all(&[
                "#documentContainerTabContainer1 .textBox .textWrapper",
                "#documentContainerTabContainer1 .textBox",
                ".documentContainer pre",
                "code",
            ]),
        );
        entries.insert(
            Role::SeeSolutionButton,
            parse_all(&[
                "//button[contains(text(), \"See Solution\")]",
                "//a[contains(text(), \"See Solution\")]",
                "[data-testid*=\"solution\"]",
                ".see-solution",
                "[aria-label*=\"solution\"]",
            ]),
        );
        entries.insert(
            Role::SubmitButton,
            parse_all(&[
                "//button[contains(text(), \"Submit\")]",
                "//button[contains(text(), \"Run\")]",
                "[data-testid*=\"submit\"]",
                ".submit-button",
                "[type=\"submit\"]",
            ]),
        );
        entries.insert(
            Role::NextTaskButton,
            parse_all(&[
                "//button[contains(text(), \"Next\")]",
                "//button[contains(text(), \"Continue\")]",
                "[data-testid*=\"next\"]",
                ".next-button",
            ]),
        );
        entries.insert(
            Role::TaskItem,
            parse_all(&[
                "[data-testid*=\"task\"]",
                ".task",
                "[class*=\"task\"]",
                ".exercise",
            ]),
        );
        entries.insert(
            Role::SuccessIndicator,
            parse_all(&[
                ".submission-success",
                "[data-testid*=\"passed\"]",
                ".assessment-correct",
                "//span[contains(text(), \"Correct\")]",
            ]),
        );

        Self { entries }
    }

    /// Apply configuration overrides on top of the defaults. Each entry
    /// replaces the whole strategy list for its role.
    pub fn with_overrides(
        mut self,
        overrides: &HashMap<String, Vec<String>>,
    ) -> Result<Self, AutomationError> {
        for (name, raw) in overrides {
            let role = Role::from_name(name).ok_or_else(|| {
                AutomationError::InvalidConfig(format!(
                    "unknown selector role '{name}' (known roles: {})",
                    Role::ALL.map(|r| r.name()).join(", ")
                ))
            })?;
            if raw.is_empty() {
                return Err(AutomationError::InvalidConfig(format!(
                    "selector list for role '{role}' is empty"
                )));
            }
            self.entries
                .insert(role, raw.iter().map(|s| Selector::parse(s)).collect());
        }
        self.validate()?;
        Ok(self)
    }

    /// Every role must carry at least one strategy.
    pub fn validate(&self) -> Result<(), AutomationError> {
        for role in Role::ALL {
            match self.entries.get(&role) {
                Some(list) if !list.is_empty() => {}
                _ => {
                    return Err(AutomationError::InvalidConfig(format!(
                        "no selector strategies configured for role '{role}'"
                    )))
                }
            }
        }
        Ok(())
    }

    pub fn selectors(&self, role: Role) -> &[Selector] {
        self.entries
            .get(&role)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl Default for SelectorBook {
    fn default() -> Self {
        Self::course_defaults()
    }
}

fn parse_all(raw: &[&str]) -> Vec<Selector> {
    raw.iter().map(|s| Selector::parse(s)).collect()
}
