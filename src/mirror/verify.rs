use serde::Serialize;
use tracing::{info, warn};

use crate::error::MirrorResult;

use super::{Mirror, VerifyResult, VerifyStatus};

/// Verification of every source branch against the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub results: Vec<VerifyResult>,
    /// Branches that are not an exact match, missing ones included.
    pub mismatches: usize,
}

impl Mirror<'_> {
    /// Compare one branch after re-fetching both remotes.
    pub fn verify_branch(&self, branch: &str) -> MirrorResult<VerifyResult> {
        self.refresh_both()?;
        Ok(self.compare_branch(branch))
    }

    /// Compare every source branch after re-fetching both remotes.
    ///
    /// All branches are checked even after the first mismatch.
    pub fn verify_all(&self) -> MirrorResult<VerifyReport> {
        self.refresh_both()?;

        let results: Vec<VerifyResult> = self
            .repo
            .remote_tracking_branches(self.source())?
            .iter()
            .map(|branch| self.compare_branch(branch))
            .collect();
        let mismatches = results.iter().filter(|r| !r.is_match()).count();

        Ok(VerifyReport {
            results,
            mismatches,
        })
    }

    // Stale tracking refs would hide out-of-band destination updates.
    fn refresh_both(&self) -> MirrorResult<()> {
        self.repo.fetch_prune(self.source(), &self.transport)?;
        self.repo.fetch_prune(self.destination(), &self.transport)?;
        Ok(())
    }

    fn compare_branch(&self, branch: &str) -> VerifyResult {
        let source = self.repo.resolve_tracking_branch(self.source(), branch);
        let destination = self.repo.resolve_tracking_branch(self.destination(), branch);

        let result = match (source, destination) {
            (Ok(source), Ok(destination)) => VerifyResult::classify(branch, source, destination),
            (Err(e), destination) => {
                VerifyResult::unresolved(branch, None, destination.ok().flatten(), e.to_string())
            }
            (Ok(source), Err(e)) => VerifyResult::unresolved(branch, source, None, e.to_string()),
        };

        match result.status {
            VerifyStatus::Match => info!(branch, hash = ?result.source_hash, "match"),
            VerifyStatus::Mismatch => warn!(
                branch,
                source = ?result.source_hash,
                destination = ?result.destination_hash,
                "mismatch"
            ),
            VerifyStatus::MissingOnDestination => warn!(branch, "missing on destination"),
        }

        result
    }
}
