//! Scripted in-memory session.
//!
//! Stands in for a real browser adapter behind the same [`SessionPort`]
//! trait: a builder wires selector bindings, node state, click and
//! navigation effects and injected transient faults. Drives the test
//! suites and `--rehearse`.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use coursepilot_core_types::{Role, Selector};
use parking_lot::Mutex;
use tracing::debug;

use crate::port::{ElementHandle, PageError, SessionPort};

/// One scripted DOM node.
#[derive(Debug, Clone)]
pub struct StubNode {
    pub text: String,
    pub interactable: bool,
    pub present: bool,
}

/// Scripted page mutation, applied when a node is clicked or a
/// navigation target is reached.
#[derive(Debug, Clone)]
pub enum PageEffect {
    /// Make a node present.
    Reveal(String),
    /// Remove a node from the page.
    Hide(String),
    /// Replace a node's text content.
    SetText { node: String, text: String },
    /// Render the whole browsing context unusable, like a crash or a
    /// navigation to an unexpected page.
    KillContext(String),
}

#[derive(Default)]
struct StubState {
    generation: u64,
    gone: Option<String>,
    nodes: HashMap<String, StubNode>,
    /// (selector expression, node id) in insertion order.
    bindings: Vec<(String, String)>,
    click_effects: HashMap<String, Vec<PageEffect>>,
    navigate_effects: HashMap<String, Vec<PageEffect>>,
    faults: HashMap<(String, &'static str), VecDeque<PageError>>,
    navigations: Vec<String>,
    screenshots: Vec<String>,
}

impl StubState {
    fn apply_effects(&mut self, effects: &[PageEffect]) {
        for effect in effects {
            match effect {
                PageEffect::Reveal(id) => {
                    if let Some(node) = self.nodes.get_mut(id) {
                        node.present = true;
                    }
                }
                PageEffect::Hide(id) => {
                    if let Some(node) = self.nodes.get_mut(id) {
                        node.present = false;
                    }
                }
                PageEffect::SetText { node: id, text } => {
                    if let Some(node) = self.nodes.get_mut(id) {
                        node.text = text.clone();
                    }
                }
                PageEffect::KillContext(reason) => {
                    self.gone = Some(reason.clone());
                }
            }
        }
    }
}

pub struct StubSession {
    state: Mutex<StubState>,
}

pub struct StubSessionBuilder {
    state: StubState,
}

impl StubSessionBuilder {
    /// Add a visible node.
    pub fn node(mut self, id: &str, text: &str, interactable: bool) -> Self {
        self.state.nodes.insert(
            id.to_string(),
            StubNode {
                text: text.to_string(),
                interactable,
                present: true,
            },
        );
        self
    }

    /// Add a node that only appears once revealed by an effect.
    pub fn hidden_node(mut self, id: &str, text: &str, interactable: bool) -> Self {
        self.state.nodes.insert(
            id.to_string(),
            StubNode {
                text: text.to_string(),
                interactable,
                present: false,
            },
        );
        self
    }

    /// Bind a selector expression to a node. A selector may be bound to
    /// several nodes; match order is insertion order.
    pub fn bind(mut self, selector: &str, node_id: &str) -> Self {
        self.state
            .bindings
            .push((selector.to_string(), node_id.to_string()));
        self
    }

    pub fn on_click(mut self, node_id: &str, effect: PageEffect) -> Self {
        self.state
            .click_effects
            .entry(node_id.to_string())
            .or_default()
            .push(effect);
        self
    }

    /// Apply `effect` whenever navigation reaches exactly `target`.
    pub fn on_navigate(mut self, target: &str, effect: PageEffect) -> Self {
        self.state
            .navigate_effects
            .entry(target.to_string())
            .or_default()
            .push(effect);
        self
    }

    pub fn build(self) -> StubSession {
        StubSession {
            state: Mutex::new(self.state),
        }
    }
}

impl StubSession {
    pub fn builder() -> StubSessionBuilder {
        StubSessionBuilder {
            state: StubState::default(),
        }
    }

    /// A complete scripted dual-panel course page: task entries, an
    /// editor, a solution panel populated by a See-Solution control, a
    /// submit control wired to a success indicator and a next-task
    /// control that clears it again.
    pub fn course_fixture(tasks: usize) -> StubSession {
        let mut builder = StubSession::builder()
            // The editor hides behind the second configured selector so a
            // rehearsal also exercises the fallback chain.
            .node("editor", "", true)
            .bind(".editorWindow.liveCode textarea", "editor")
            .node("solution", "", false)
            .bind(
                "#documentContainerTabContainer1 .textBox .textWrapper",
                "solution",
            )
            .node("see-solution", "See Solution", true)
            .bind("//button[contains(text(), \"See Solution\")]", "see-solution")
            .on_click(
                "see-solution",
                PageEffect::SetText {
                    node: "solution".to_string(),
                    text: "x = linspace(0, 2*pi);\ny = sin(x);\nplot(x, y)".to_string(),
                },
            )
            .node("submit", "Submit", true)
            .bind("//button[contains(text(), \"Submit\")]", "submit")
            .on_click("submit", PageEffect::Reveal("success".to_string()))
            .hidden_node("success", "Correct!", false)
            .bind(".submission-success", "success")
            .node("next", "Next", true)
            .bind("//button[contains(text(), \"Next\")]", "next")
            .on_click("next", PageEffect::Hide("success".to_string()));

        for i in 1..=tasks {
            let id = format!("task-{i}");
            builder = builder
                .node(&id, &format!("Task {i}"), true)
                .bind(".task", &id);
        }

        builder.build()
    }

    /// Queue a transient failure for the next `op` on `node_id`.
    /// `op` is one of `read`, `clear`, `insert`, `click`, `interactable`.
    pub fn fail_next(&self, node_id: &str, op: &'static str, err: PageError) {
        self.state
            .lock()
            .faults
            .entry((node_id.to_string(), op))
            .or_default()
            .push_back(err);
    }

    /// Render the whole browsing context unusable from now on.
    pub fn set_gone(&self, reason: &str) {
        self.state.lock().gone = Some(reason.to_string());
    }

    pub fn set_present(&self, node_id: &str, present: bool) {
        if let Some(node) = self.state.lock().nodes.get_mut(node_id) {
            node.present = present;
        }
    }

    pub fn set_interactable(&self, node_id: &str, interactable: bool) {
        if let Some(node) = self.state.lock().nodes.get_mut(node_id) {
            node.interactable = interactable;
        }
    }

    pub fn set_text(&self, node_id: &str, text: &str) {
        if let Some(node) = self.state.lock().nodes.get_mut(node_id) {
            node.text = text.to_string();
        }
    }

    pub fn text_of(&self, node_id: &str) -> Option<String> {
        self.state.lock().nodes.get(node_id).map(|n| n.text.clone())
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    pub fn screenshots(&self) -> Vec<String> {
        self.state.lock().screenshots.clone()
    }

    fn take_fault(state: &mut StubState, node_id: &str, op: &'static str) -> Option<PageError> {
        state
            .faults
            .get_mut(&(node_id.to_string(), op))
            .and_then(|queue| queue.pop_front())
    }

    fn check_context(state: &StubState) -> Result<(), PageError> {
        match &state.gone {
            Some(reason) => Err(PageError::Gone(reason.clone())),
            None => Ok(()),
        }
    }

    fn check_handle(state: &StubState, handle: &ElementHandle) -> Result<(), PageError> {
        Self::check_context(state)?;
        if handle.generation != state.generation {
            return Err(PageError::Stale(format!(
                "handle for '{}' minted in generation {}, page is at {}",
                handle.role, handle.generation, state.generation
            )));
        }
        match state.nodes.get(&handle.node_id) {
            Some(node) if node.present => Ok(()),
            _ => Err(PageError::Transport(format!(
                "node '{}' detached from page",
                handle.node_id
            ))),
        }
    }
}

#[async_trait]
impl SessionPort for StubSession {
    async fn navigate(&self, target: &str) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_context(&state)?;
        debug!(target, "stub navigation");
        state.navigations.push(target.to_string());
        state.generation += 1;
        if let Some(effects) = state.navigate_effects.get(target).cloned() {
            state.apply_effects(&effects);
        }
        Ok(())
    }

    async fn query(&self, selector: &Selector, role: Role) -> Result<Vec<ElementHandle>, PageError> {
        let state = self.state.lock();
        Self::check_context(&state)?;
        let generation = state.generation;
        let handles = state
            .bindings
            .iter()
            .filter(|(expr, _)| expr == selector.expression())
            .filter(|(_, node_id)| state.nodes.get(node_id).map(|n| n.present).unwrap_or(false))
            .map(|(_, node_id)| ElementHandle::new(node_id.clone(), role, generation))
            .collect();
        Ok(handles)
    }

    async fn is_interactable(&self, handle: &ElementHandle) -> Result<bool, PageError> {
        let mut state = self.state.lock();
        Self::check_handle(&state, handle)?;
        if let Some(err) = Self::take_fault(&mut state, &handle.node_id, "interactable") {
            return Err(err);
        }
        Ok(state.nodes[&handle.node_id].interactable)
    }

    async fn read_text(&self, handle: &ElementHandle) -> Result<String, PageError> {
        let mut state = self.state.lock();
        Self::check_handle(&state, handle)?;
        if let Some(err) = Self::take_fault(&mut state, &handle.node_id, "read") {
            return Err(err);
        }
        Ok(state.nodes[&handle.node_id].text.clone())
    }

    async fn clear_text(&self, handle: &ElementHandle) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_handle(&state, handle)?;
        if let Some(err) = Self::take_fault(&mut state, &handle.node_id, "clear") {
            return Err(err);
        }
        state.nodes.get_mut(&handle.node_id).unwrap().text.clear();
        Ok(())
    }

    async fn insert_text(&self, handle: &ElementHandle, text: &str) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_handle(&state, handle)?;
        if let Some(err) = Self::take_fault(&mut state, &handle.node_id, "insert") {
            return Err(err);
        }
        let node = state.nodes.get_mut(&handle.node_id).unwrap();
        if !node.interactable {
            return Err(PageError::NotInteractable(handle.node_id.clone()));
        }
        // Appends rather than replaces: a caller that skips clearing
        // first will observe duplicated content, like a real editor.
        node.text.push_str(text);
        Ok(())
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_handle(&state, handle)?;
        if let Some(err) = Self::take_fault(&mut state, &handle.node_id, "click") {
            return Err(err);
        }
        if !state.nodes[&handle.node_id].interactable {
            return Err(PageError::NotInteractable(handle.node_id.clone()));
        }
        if let Some(effects) = state.click_effects.get(&handle.node_id).cloned() {
            state.apply_effects(&effects);
        }
        Ok(())
    }

    async fn capture_screenshot(&self, label: &str) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_context(&state)?;
        state.screenshots.push(label.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_selector() -> Selector {
        Selector::parse("#editor textarea")
    }

    fn session_with_editor() -> StubSession {
        StubSession::builder()
            .node("editor", "old content", true)
            .bind("#editor textarea", "editor")
            .build()
    }

    #[tokio::test]
    async fn handles_go_stale_across_navigation() {
        let session = session_with_editor();
        let handle = session
            .query(&editor_selector(), Role::LeftPanelEditor)
            .await
            .unwrap()
            .remove(0);

        session.navigate("course#task2").await.unwrap();

        let err = session.read_text(&handle).await.unwrap_err();
        assert!(matches!(err, PageError::Stale(_)));

        // Re-querying after the navigation yields a usable handle again.
        let fresh = session
            .query(&editor_selector(), Role::LeftPanelEditor)
            .await
            .unwrap()
            .remove(0);
        assert_eq!(session.read_text(&fresh).await.unwrap(), "old content");
    }

    #[tokio::test]
    async fn click_effects_mutate_the_page() {
        let session = StubSession::builder()
            .node("submit", "Submit", true)
            .bind(".submit", "submit")
            .hidden_node("badge", "Correct!", false)
            .bind(".badge", "badge")
            .on_click("submit", PageEffect::Reveal("badge".to_string()))
            .build();

        let badge_sel = Selector::parse(".badge");
        assert!(session
            .query(&badge_sel, Role::SuccessIndicator)
            .await
            .unwrap()
            .is_empty());

        let submit = session
            .query(&Selector::parse(".submit"), Role::SubmitButton)
            .await
            .unwrap()
            .remove(0);
        session.click(&submit).await.unwrap();

        assert_eq!(
            session
                .query(&badge_sel, Role::SuccessIndicator)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn navigation_effects_rewrite_the_page() {
        let session = StubSession::builder()
            .node("solution", "sol 1", false)
            .bind(".solution", "solution")
            .on_navigate(
                "course#task2",
                PageEffect::SetText {
                    node: "solution".to_string(),
                    text: "sol 2".to_string(),
                },
            )
            .build();

        session.navigate("course#task2").await.unwrap();
        assert_eq!(session.text_of("solution").unwrap(), "sol 2");
    }

    #[tokio::test]
    async fn injected_faults_fire_once() {
        let session = session_with_editor();
        let handle = session
            .query(&editor_selector(), Role::LeftPanelEditor)
            .await
            .unwrap()
            .remove(0);

        session.fail_next("editor", "read", PageError::Transport("flaky".into()));

        assert!(session.read_text(&handle).await.is_err());
        assert_eq!(session.read_text(&handle).await.unwrap(), "old content");
    }

    #[tokio::test]
    async fn gone_context_rejects_everything() {
        let session = session_with_editor();
        session.set_gone("tab crashed");

        let err = session
            .query(&editor_selector(), Role::LeftPanelEditor)
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Gone(_)));
        assert!(!err.is_transient());
    }
}
