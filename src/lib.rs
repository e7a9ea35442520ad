//! CoursePilot CLI wiring: configuration surface and argument parsing.
//!
//! The automation kernel itself lives in the workspace crates; this
//! package only loads and validates configuration, picks a session and
//! hands everything to the batch orchestrator.

pub mod cli;
pub mod config;

pub use cli::Cli;
pub use config::AppConfig;
