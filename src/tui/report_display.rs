use console::style;

use crate::mirror::{
    BatchReport, RepositoryReport, SyncOutcome, SyncResult, Totals, VerifyResult, VerifyStatus,
};

/// Display a batch report in a formatted way
pub fn display_report(report: &BatchReport) {
    if report.repositories.is_empty() && !report.cancelled {
        println!("{} No repositories to process", style("⚠").yellow());
        return;
    }

    for repository in &report.repositories {
        display_repository(repository);
    }

    if report.cancelled {
        println!(
            "{} {}",
            style("⚠").yellow().bold(),
            style("Cancelled before all repositories were processed").yellow()
        );
        println!();
    }

    display_totals(&report.totals());
}

fn display_repository(report: &RepositoryReport) {
    let marker = if report.succeeded() {
        style("✓").green().bold()
    } else {
        style("✗").red().bold()
    };
    println!(
        "{} {} {}",
        marker,
        style(&report.repository.name).cyan().bold(),
        style(report.repository.path.display()).dim()
    );

    if let Some(remotes) = &report.remotes {
        for remote in [&remotes.source, &remotes.destination] {
            println!(
                "  {} {} {} {}",
                style("📡").blue(),
                style(remote.role).dim(),
                style(&remote.name).cyan(),
                style(&remote.url).dim()
            );
        }
    }

    if let Some(summary) = &report.fetch_summary {
        println!("  {} {}", style("⬇").blue(), summary);
    }

    for branch in &report.branches {
        println!("  {} {}", style("•").dim(), style(branch).cyan());
    }

    for result in &report.sync {
        display_sync_result(result);
    }

    for result in &report.verify {
        display_verify_result(result);
    }

    if let Some(error) = &report.fatal {
        println!(
            "  {} {}: {}",
            style("✗").red().bold(),
            style(error.kind()).red(),
            style(error).red()
        );
    }

    println!(); // Empty line between repositories
}

fn display_sync_result(result: &SyncResult) {
    match result.outcome {
        SyncOutcome::Pushed => println!(
            "  {} {} {}",
            style("✓").green().bold(),
            style(&result.branch).cyan(),
            style("pushed").green()
        ),
        SyncOutcome::Skipped => println!(
            "  {} {} {}",
            style("=").dim(),
            style(&result.branch).cyan(),
            style("already up to date").dim()
        ),
        SyncOutcome::Failed => println!(
            "  {} {} {}",
            style("✗").red().bold(),
            style(&result.branch).cyan(),
            style(result.error.as_deref().unwrap_or("push failed")).red()
        ),
    }
}

fn display_verify_result(result: &VerifyResult) {
    let short = |hash: &Option<String>| {
        hash.as_deref()
            .map(|h| h.chars().take(10).collect::<String>())
            .unwrap_or_else(|| "-".to_string())
    };

    match result.status {
        VerifyStatus::Match => println!(
            "  {} {} {}",
            style("✅").green(),
            style(&result.branch).cyan(),
            style(short(&result.source_hash)).dim()
        ),
        VerifyStatus::Mismatch => println!(
            "  {} {} source {} destination {}{}",
            style("🔄").yellow(),
            style(&result.branch).cyan(),
            style(short(&result.source_hash)).yellow(),
            style(short(&result.destination_hash)).yellow(),
            result
                .error
                .as_deref()
                .map(|e| format!(" ({e})"))
                .unwrap_or_default()
        ),
        VerifyStatus::MissingOnDestination => println!(
            "  {} {} {}",
            style("⚠").yellow(),
            style(&result.branch).cyan(),
            style("missing on destination").yellow()
        ),
    }
}

fn display_totals(totals: &Totals) {
    println!(
        "{} {} repositories, {} failed",
        style("📊").cyan().bold(),
        totals.repositories,
        totals.failed_repositories
    );
    if totals.pushed + totals.skipped + totals.failed > 0 {
        println!(
            "  branches: {} pushed, {} skipped, {} failed",
            style(totals.pushed).green(),
            style(totals.skipped).dim(),
            style(totals.failed).red()
        );
    }
    if totals.matched + totals.mismatched + totals.missing > 0 {
        println!(
            "  verification: {} matched, {} mismatched, {} missing",
            style(totals.matched).green(),
            style(totals.mismatched).yellow(),
            style(totals.missing).yellow()
        );
    }
}
