//! Semantic element roles for the dual-panel course layout.

use serde::{Deserialize, Serialize};

/// Semantic identifier for a UI element, independent of concrete markup.
///
/// The set is closed on purpose: selector configuration is validated
/// against it at load time, so a typo in a config file surfaces before a
/// run starts instead of mid-batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Editable code panel on the left side of a task.
    LeftPanelEditor,
    /// Rendered reference solution on the right side.
    RightPanelSolution,
    /// Control revealing the solution content, when the course hides it.
    SeeSolutionButton,
    /// Submit/run control for a task, when one exists.
    SubmitButton,
    /// Control advancing to the next task.
    NextTaskButton,
    /// One entry in the course's task list.
    TaskItem,
    /// Acknowledgment element rendered after a successful submission.
    SuccessIndicator,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::LeftPanelEditor,
        Role::RightPanelSolution,
        Role::SeeSolutionButton,
        Role::SubmitButton,
        Role::NextTaskButton,
        Role::TaskItem,
        Role::SuccessIndicator,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Role::LeftPanelEditor => "left-panel-editor",
            Role::RightPanelSolution => "right-panel-solution",
            Role::SeeSolutionButton => "see-solution-button",
            Role::SubmitButton => "submit-button",
            Role::NextTaskButton => "next-task-button",
            Role::TaskItem => "task-item",
            Role::SuccessIndicator => "success-indicator",
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        Role::ALL.iter().copied().find(|r| r.name() == name)
    }

    /// Whether locating this role must also wait for interactability.
    /// Read-only roles only need presence.
    pub fn is_interactive(&self) -> bool {
        !matches!(self, Role::RightPanelSolution | Role::SuccessIndicator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Interaction kind performed by the action executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionOp {
    Read,
    Write,
    Click,
    Navigate,
}

impl ActionOp {
    pub fn name(&self) -> &'static str {
        match self {
            ActionOp::Read => "read",
            ActionOp::Write => "write",
            ActionOp::Click => "click",
            ActionOp::Navigate => "navigate",
        }
    }
}

impl std::fmt::Display for ActionOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_name(role.name()), Some(role));
        }
        assert_eq!(Role::from_name("right-panel"), None);
    }

    #[test]
    fn read_only_roles_skip_interactability() {
        assert!(!Role::RightPanelSolution.is_interactive());
        assert!(!Role::SuccessIndicator.is_interactive());
        assert!(Role::LeftPanelEditor.is_interactive());
        assert!(Role::SubmitButton.is_interactive());
    }
}
