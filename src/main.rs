mod cli;
mod commands;
mod config;
mod error;
mod git;
mod logging;
mod mirror;
mod test_utils;
mod tui;

use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.quiet) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    match commands::mirror::handle_mirror(&cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
