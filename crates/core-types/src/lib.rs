//! Shared primitives for the CoursePilot automation kernel.

pub mod errors;
pub mod policy;
pub mod role;
pub mod selector;

pub use errors::*;
pub use policy::*;
pub use role::*;
pub use selector::*;

use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
