//! Logging setup using the `tracing` ecosystem.
//!
//! Logs go to stderr so stdout stays clean for the report. `RUST_LOG`
//! overrides the level picked from `-v`/`-q`.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for the given verbosity.
///
/// `quiet` wins over any number of `-v` flags.
pub fn filter_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, quiet)));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose > 2),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
