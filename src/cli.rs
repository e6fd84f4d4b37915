use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::mirror::Operation;

#[derive(Parser)]
#[command(name = "mirror", version)]
#[command(about = "Mirror branches from a source git host to a destination")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./mirror.toml when present)
    #[arg(short, long, global = true, env = "MIRROR_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Repository checkout to process; repeat for several
    #[arg(short, long = "repo", global = true, value_name = "PATH")]
    pub repos: Vec<PathBuf>,

    /// Timeout in seconds for each fetch or push (0 disables)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Report format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// More logging; repeat for more detail
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Create or replace the source and destination remotes
    SetupRemotes,
    /// Check that both remotes are configured
    VerifyRemotes,
    /// Fetch the source remote with pruning
    FetchSource,
    /// List branches on the source remote
    ListBranches,
    /// Force-push one branch from source to destination
    SyncBranch {
        /// Branch to mirror (defaults to the configured default branch)
        branch: Option<String>,
    },
    /// Force-push every source branch to the destination
    SyncAll,
    /// Compare source and destination commit hashes for every branch
    VerifyCommits,
    /// Setup remotes, sync every branch, then verify
    FullSync,
}

impl Commands {
    pub fn operation(&self, default_branch: &str) -> Operation {
        match self {
            Self::SetupRemotes => Operation::SetupRemotes,
            Self::VerifyRemotes => Operation::VerifyRemotes,
            Self::FetchSource => Operation::FetchSource,
            Self::ListBranches => Operation::ListBranches,
            Self::SyncBranch { branch } => Operation::SyncBranch(
                branch
                    .clone()
                    .unwrap_or_else(|| default_branch.to_string()),
            ),
            Self::SyncAll => Operation::SyncAll,
            Self::VerifyCommits => Operation::VerifyCommits,
            Self::FullSync => Operation::FullSync,
        }
    }
}
