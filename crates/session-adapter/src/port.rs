//! The session port trait and its wire types.

use async_trait::async_trait;
use coursepilot_core_types::{Role, Selector};
use thiserror::Error;

/// Live reference to a DOM node, scoped to the page state it was minted
/// in. `generation` is the DOM generation at location time; the port
/// rejects handles from an earlier generation, so a handle can never be
/// reused across a navigation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub node_id: String,
    pub role: Role,
    pub generation: u64,
}

impl ElementHandle {
    pub fn new(node_id: impl Into<String>, role: Role, generation: u64) -> Self {
        Self {
            node_id: node_id.into(),
            role,
            generation,
        }
    }
}

/// Transport-level failure reported by a session adapter.
#[derive(Debug, Error, Clone)]
pub enum PageError {
    /// The handle refers to a node from a previous DOM generation.
    #[error("stale element: {0}")]
    Stale(String),

    /// The element exists but cannot currently be interacted with.
    #[error("element not interactable: {0}")]
    NotInteractable(String),

    /// Recoverable transport or protocol hiccup.
    #[error("transport error: {0}")]
    Transport(String),

    /// The browsing context is no longer usable at all.
    #[error("browsing context gone: {0}")]
    Gone(String),
}

impl PageError {
    /// Transient failures are worth another attempt; `Gone` never is.
    pub fn is_transient(&self) -> bool {
        !matches!(self, PageError::Gone(_))
    }
}

/// Capability contract an authenticated browser session must provide.
///
/// Mirrors what the kernel actually consumes: navigation, read-only DOM
/// queries, a handful of element interactions and screenshot capture for
/// the observability sink. Everything else (window setup, stealth flags,
/// credential flows) stays behind the adapter.
#[async_trait]
pub trait SessionPort: Send + Sync {
    async fn navigate(&self, target: &str) -> Result<(), PageError>;

    /// All nodes currently matching `selector`, tagged with `role` so the
    /// resulting handles carry their semantic origin.
    async fn query(&self, selector: &Selector, role: Role) -> Result<Vec<ElementHandle>, PageError>;

    async fn is_interactable(&self, handle: &ElementHandle) -> Result<bool, PageError>;

    async fn read_text(&self, handle: &ElementHandle) -> Result<String, PageError>;

    async fn clear_text(&self, handle: &ElementHandle) -> Result<(), PageError>;

    async fn insert_text(&self, handle: &ElementHandle, text: &str) -> Result<(), PageError>;

    async fn click(&self, handle: &ElementHandle) -> Result<(), PageError>;

    async fn capture_screenshot(&self, label: &str) -> Result<(), PageError>;
}
