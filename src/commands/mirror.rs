use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cli::{Cli, OutputFormat};
use crate::config::MirrorConfig;
use crate::mirror::{run_batch, BatchReport, Totals};
use crate::tui::report_display;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a BatchReport,
    totals: Totals,
    success: bool,
}

/// Run the requested operation over every configured repository.
///
/// Returns whether the whole batch succeeded; the caller turns that into the
/// exit code.
pub async fn handle_mirror(cli: &Cli) -> Result<bool> {
    let config = MirrorConfig::load(cli.config.as_deref())?;
    let operation = cli.command.operation(&config.default_branch);
    let targets = config.targets(&cli.repos);
    let settings = config.batch_settings(cli.timeout);
    settings
        .transport
        .install_server_timeouts()
        .context("Failed to configure transport timeouts")?;

    info!(?operation, repositories = targets.len(), "starting batch");

    let cancel = Arc::new(AtomicBool::new(false));
    let listener = spawn_cancel_listener(Arc::clone(&cancel));

    // git2 calls block, keep them off the async workers
    let report = tokio::task::spawn_blocking(move || {
        run_batch(&targets, &operation, &settings, &cancel)
    })
    .await
    .context("Batch worker stopped unexpectedly")?;
    listener.abort();

    render(&report, cli.format)?;
    Ok(report.is_success())
}

/// Exit status after a second Ctrl-C, as a shell reports SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Ctrl-C stops the batch between repositories; a second one exits at once.
fn spawn_cancel_listener(cancel: Arc<AtomicBool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, &cancel).await {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    })
}

/// Set `cancel` on the first interrupt. Returns `true` once a second
/// interrupt arrives, `false` if the signal handler could not be installed.
async fn watch_interrupts<F, Fut>(mut interrupt: F, cancel: &AtomicBool) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if interrupt().await.is_err() {
        return false;
    }
    warn!("interrupt received, stopping after the current repository (Ctrl-C again to abort)");
    cancel.store(true, Ordering::SeqCst);

    if interrupt().await.is_err() {
        return false;
    }
    warn!("second interrupt received, aborting");
    true
}

fn render(report: &BatchReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => report_display::display_report(report),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonReport {
                report,
                totals: report.totals(),
                success: report.is_success(),
            })
            .context("Failed to serialize report")?;
            println!("{json}");
        }
    }
    Ok(())
}
