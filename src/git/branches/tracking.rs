use std::collections::BTreeSet;

use git2::{ErrorCode, Oid, ReferenceType};

use crate::error::{MirrorError, MirrorResult};
use crate::git::repository::core::GitRepo;

/// Full name of the remote-tracking ref for `branch` on `remote`
pub fn tracking_ref(remote: &str, branch: &str) -> String {
    format!("refs/remotes/{remote}/{branch}")
}

impl GitRepo {
    /// Branch names under `refs/remotes/<remote>/`, sorted and without
    /// symbolic refs such as `<remote>/HEAD`.
    ///
    /// `remote` must not contain `/`: the refs of a remote named
    /// `<remote>/other` would be listed as `other/<branch>`.
    pub fn remote_tracking_branches(&self, remote: &str) -> MirrorResult<Vec<String>> {
        let prefix = format!("refs/remotes/{remote}/");
        let mut branches = BTreeSet::new();

        for reference in self.repo().references_glob(&format!("{prefix}*"))? {
            let reference = reference?;
            if reference.kind() != Some(ReferenceType::Direct) {
                continue;
            }
            if let Some(branch) = reference.name().and_then(|n| n.strip_prefix(&prefix)) {
                branches.insert(branch.to_string());
            }
        }

        Ok(branches.into_iter().collect())
    }

    /// Commit id of `refs/remotes/<remote>/<branch>`, or `None` when the ref
    /// does not exist.
    pub fn resolve_tracking_branch(&self, remote: &str, branch: &str) -> MirrorResult<Option<Oid>> {
        let refname = tracking_ref(remote, branch);
        let resolution_error = |e: git2::Error| MirrorError::HashResolution {
            reference: refname.clone(),
            message: e.message().to_string(),
        };

        let reference = match self.repo().find_reference(&refname) {
            Ok(reference) => reference,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(resolution_error(e)),
        };

        let commit = reference.peel_to_commit().map_err(resolution_error)?;
        Ok(Some(commit.id()))
    }
}
