use git2::Oid;
use serde::Serialize;

use crate::error::MirrorError;

use super::{RemotePair, RepositoryTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Pushed,
    /// Destination already pointed at the source tip
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub branch: String,
    pub outcome: SyncOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    pub fn pushed(branch: &str) -> Self {
        Self {
            branch: branch.to_string(),
            outcome: SyncOutcome::Pushed,
            error: None,
        }
    }

    pub fn skipped(branch: &str) -> Self {
        Self {
            branch: branch.to_string(),
            outcome: SyncOutcome::Skipped,
            error: None,
        }
    }

    pub fn failed(branch: &str, error: impl Into<String>) -> Self {
        Self {
            branch: branch.to_string(),
            outcome: SyncOutcome::Failed,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyStatus {
    Match,
    Mismatch,
    MissingOnDestination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyResult {
    pub branch: String,
    pub status: VerifyStatus,
    pub source_hash: Option<String>,
    pub destination_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResult {
    /// Classify a branch from the tips resolved on each side.
    pub fn classify(branch: &str, source: Option<Oid>, destination: Option<Oid>) -> Self {
        let status = match (source, destination) {
            (_, None) => VerifyStatus::MissingOnDestination,
            (Some(s), Some(d)) if s == d => VerifyStatus::Match,
            _ => VerifyStatus::Mismatch,
        };

        Self {
            branch: branch.to_string(),
            status,
            source_hash: source.map(|oid| oid.to_string()),
            destination_hash: destination.map(|oid| oid.to_string()),
            error: None,
        }
    }

    /// A branch whose tips could not be resolved counts as a mismatch.
    pub fn unresolved(
        branch: &str,
        source: Option<Oid>,
        destination: Option<Oid>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            branch: branch.to_string(),
            status: VerifyStatus::Mismatch,
            source_hash: source.map(|oid| oid.to_string()),
            destination_hash: destination.map(|oid| oid.to_string()),
            error: Some(error.into()),
        }
    }

    pub fn is_match(&self) -> bool {
        self.status == VerifyStatus::Match
    }
}

/// Everything that happened to one repository during a batch.
#[derive(Debug, Serialize)]
pub struct RepositoryReport {
    pub repository: RepositoryTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remotes: Option<RemotePair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sync: Vec<SyncResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub verify: Vec<VerifyResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal: Option<MirrorError>,
}

impl RepositoryReport {
    pub fn new(repository: RepositoryTarget) -> Self {
        Self {
            repository,
            remotes: None,
            fetch_summary: None,
            branches: Vec::new(),
            sync: Vec::new(),
            verify: Vec::new(),
            fatal: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.fatal.is_none()
            && self.sync.iter().all(|r| r.outcome != SyncOutcome::Failed)
            && self.verify.iter().all(VerifyResult::is_match)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub repositories: usize,
    pub failed_repositories: usize,
    pub pushed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub missing: usize,
}

/// Outcome of one batch invocation, in repository order.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub repositories: Vec<RepositoryReport>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn totals(&self) -> Totals {
        let mut totals = Totals {
            repositories: self.repositories.len(),
            ..Totals::default()
        };

        for report in &self.repositories {
            if !report.succeeded() {
                totals.failed_repositories += 1;
            }
            for result in &report.sync {
                match result.outcome {
                    SyncOutcome::Pushed => totals.pushed += 1,
                    SyncOutcome::Skipped => totals.skipped += 1,
                    SyncOutcome::Failed => totals.failed += 1,
                }
            }
            for result in &report.verify {
                match result.status {
                    VerifyStatus::Match => totals.matched += 1,
                    VerifyStatus::Mismatch => totals.mismatched += 1,
                    VerifyStatus::MissingOnDestination => totals.missing += 1,
                }
            }
        }

        totals
    }

    pub fn is_success(&self) -> bool {
        !self.cancelled && self.repositories.iter().all(RepositoryReport::succeeded)
    }
}
