//! Browser session boundary.
//!
//! The automation kernel never owns a browser: it borrows an
//! already-authenticated, navigable session through [`SessionPort`].
//! Process lifecycle, profiles and login belong to whichever adapter
//! implements the port. This crate ships the port itself plus a scripted
//! in-memory [`StubSession`] used by the test suites and the CLI
//! rehearsal mode.

pub mod port;
pub mod stub;

pub use port::*;
pub use stub::*;
