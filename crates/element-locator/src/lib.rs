//! Role-based element resolution.
//!
//! A semantic role resolves to a live element through an ordered list of
//! selector strategies, most-specific first. Course pages from different
//! rendering passes expose slightly different markup for the same logical
//! element; trying the whole chain before giving up keeps a batch run
//! resilient to layout drift without code changes.

pub mod book;
pub mod locator;

pub use book::*;
pub use locator::*;
