//! Command-line interface.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "coursepilot",
    version,
    about = "Batch solution extraction and injection for dual-panel online courses"
)]
pub struct Cli {
    /// Course URL to open before processing. The session must already be
    /// authenticated; login is not performed here.
    pub course_url: Option<String>,

    /// Path to a JSON configuration file (selectors, timing, error handling).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Process at most this many tasks.
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Drive the built-in scripted course page instead of a real browser.
    /// Useful to validate configuration and watch the full task flow.
    #[arg(long)]
    pub rehearse: bool,

    /// Write the JSON run report to this file.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}
