//! Branch mirroring engine.
//!
//! ```text
//! run_batch(targets, operation)
//!     |
//!     v  per repository (explicit GitRepo handle)
//! registry   ensure_remote / verify_remotes
//!     |
//!     v
//! branches   fetch --prune, list refs/remotes/<source>/*
//!     |
//!     v
//! sync       +refs/remotes/<source>/B -> refs/heads/B on destination
//!     |
//!     v
//! verify     re-fetch both, compare tips per branch
//!     |
//!     v
//! BatchReport
//! ```

pub mod batch;
pub mod branches;
pub mod registry;
pub mod report;
pub mod sync;
pub mod verify;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::git::{GitRepo, TransportOptions};

pub use batch::{run_batch, BatchSettings, Operation, RepositoryTarget};
pub use report::{
    BatchReport, RepositoryReport, SyncOutcome, SyncResult, Totals, VerifyResult, VerifyStatus,
};
pub use verify::VerifyReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteRole {
    Source,
    Destination,
}

impl fmt::Display for RemoteRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// A named remote bound to a URL, playing one side of the mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    pub url: String,
    pub role: RemoteRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemotePair {
    pub source: Remote,
    pub destination: Remote,
}

/// Remote names used in every repository of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteNames {
    pub source: String,
    pub destination: String,
}

impl RemoteNames {
    pub fn get(&self, role: RemoteRole) -> &str {
        match role {
            RemoteRole::Source => &self.source,
            RemoteRole::Destination => &self.destination,
        }
    }
}

/// Sync and verification for one repository whose remotes are known.
pub struct Mirror<'a> {
    repo: &'a GitRepo,
    remotes: &'a RemotePair,
    transport: TransportOptions,
}

impl<'a> Mirror<'a> {
    pub fn new(repo: &'a GitRepo, remotes: &'a RemotePair, transport: TransportOptions) -> Self {
        Self {
            repo,
            remotes,
            transport,
        }
    }

    fn source(&self) -> &str {
        &self.remotes.source.name
    }

    fn destination(&self) -> &str {
        &self.remotes.destination.name
    }
}
