use git2::Oid;
use tracing::{info, warn};

use crate::error::{MirrorError, MirrorResult};
use crate::git::tracking_ref;

use super::branches::list_branches;
use super::{Mirror, SyncResult};

impl Mirror<'_> {
    /// Mirror a single branch from the source to the destination.
    ///
    /// Fails with [`MirrorError::BranchNotFound`] before any push when the
    /// source does not have `branch`. Push failures are returned as a
    /// `Failed` result, not as an error.
    pub fn sync_branch(&self, branch: &str) -> MirrorResult<SyncResult> {
        self.repo.fetch_prune(self.source(), &self.transport)?;

        let source_tip = self
            .repo
            .resolve_tracking_branch(self.source(), branch)?
            .ok_or_else(|| MirrorError::BranchNotFound {
                remote: self.source().to_string(),
                branch: branch.to_string(),
            })?;

        let destination_fresh = self.refresh_destination();
        Ok(self.push_branch(branch, source_tip, destination_fresh))
    }

    /// Mirror every branch the source has, one result per branch.
    pub fn sync_all(&self) -> MirrorResult<Vec<SyncResult>> {
        let branches = list_branches(self.repo, &self.remotes.source, &self.transport)?;
        if branches.is_empty() {
            return Err(MirrorError::NoBranchesFound {
                remote: self.source().to_string(),
            });
        }

        let destination_fresh = self.refresh_destination();

        let results = branches
            .iter()
            .map(
                |branch| match self.repo.resolve_tracking_branch(self.source(), branch) {
                    Ok(Some(tip)) => self.push_branch(branch, tip, destination_fresh),
                    Ok(None) => SyncResult::failed(branch, "source tracking ref vanished"),
                    Err(e) => SyncResult::failed(branch, e.to_string()),
                },
            )
            .collect();

        Ok(results)
    }

    /// Fetch the destination so branches already in place can be skipped.
    /// A failed fetch only disables skipping.
    fn refresh_destination(&self) -> bool {
        match self.repo.fetch_prune(self.destination(), &self.transport) {
            Ok(_) => true,
            Err(e) => {
                warn!(remote = self.destination(), error = %e, "destination fetch failed, pushing every branch");
                false
            }
        }
    }

    fn push_branch(&self, branch: &str, source_tip: Oid, destination_fresh: bool) -> SyncResult {
        if destination_fresh {
            if let Ok(Some(destination_tip)) =
                self.repo.resolve_tracking_branch(self.destination(), branch)
            {
                if destination_tip == source_tip {
                    info!(branch, tip = %source_tip, "already up to date");
                    return SyncResult::skipped(branch);
                }
            }
        }

        let source_ref = tracking_ref(self.source(), branch);
        match self
            .repo
            .push_force(self.destination(), &source_ref, branch, &self.transport)
        {
            Ok(()) => {
                info!(branch, tip = %source_tip, "pushed");
                SyncResult::pushed(branch)
            }
            Err(e) => {
                warn!(branch, error = %e, "push failed");
                SyncResult::failed(branch, e.to_string())
            }
        }
    }
}
