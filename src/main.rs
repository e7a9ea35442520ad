//! CoursePilot entry point.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use coursepilot_cli::{AppConfig, Cli};
use session_adapter::{SessionPort, StubSession};
use task_engine::{BatchOrchestrator, RunReport, TracingSink};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let book = config.selector_book().context("validating selectors")?;

    let session: Arc<dyn SessionPort> = if cli.rehearse {
        info!("rehearsal mode: driving the scripted course page");
        Arc::new(StubSession::course_fixture(cli.limit.unwrap_or(3).max(1)))
    } else {
        // Browser lifecycle and login are adapter territory; this build
        // ships only the scripted session. Embedders plug a real
        // SessionPort into the engine crates directly.
        bail!(
            "no browser adapter is wired into this build; \
             run with --rehearse, or embed task-engine with your own SessionPort"
        );
    };

    if let Some(url) = &cli.course_url {
        session
            .navigate(url)
            .await
            .with_context(|| format!("opening course page {url}"))?;
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, stopping before the next task");
                cancel.cancel();
            }
        });
    }

    let orchestrator = BatchOrchestrator::new(
        session,
        book,
        config.engine_config(),
        Arc::new(TracingSink),
    );

    let mut tasks = orchestrator
        .discover_tasks(cli.limit)
        .await
        .context("enumerating course tasks")?;
    if tasks.is_empty() {
        bail!("no tasks found on the course page");
    }
    info!(count = tasks.len(), "starting batch");

    let report = orchestrator.run(&mut tasks, &cancel).await;
    print_summary(&report);

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;
        info!(path = %path.display(), "run report written");
    }

    // The session stays open for manual inspection; teardown belongs to
    // whoever owns the browser.
    if report.succeeded == 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!();
    println!("run {}", report.run_id);
    println!(
        "  total {}   succeeded {}   failed {}   skipped {}   pending {}",
        report.total, report.succeeded, report.failed, report.skipped, report.pending
    );
    println!("  completion {:.1}%", report.completion_pct);
    for record in &report.records {
        match &record.reason {
            Some(reason) => println!(
                "  task {:>3}  {:<11} {}",
                record.ordinal,
                record.status.name(),
                reason
            ),
            None => println!(
                "  task {:>3}  {}",
                record.ordinal,
                record.status.name()
            ),
        }
    }
    if let Some(reason) = &report.aborted {
        println!("  aborted: {reason}");
    }
}
