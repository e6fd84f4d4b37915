//! Error types for mirroring operations.
//!
//! Branch-local failures (a rejected push, an unresolvable ref) are captured
//! into per-branch results by the callers; everything else bubbles up as a
//! [`MirrorError`] and stops the current repository only.

use std::path::PathBuf;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::mirror::RemoteRole;

/// Result type using [`MirrorError`].
pub type MirrorResult<T> = std::result::Result<T, MirrorError>;

#[derive(Debug, Error)]
pub enum MirrorError {
    /// The repository has no remote configured for the given role.
    #[error("{role} remote '{name}' is not configured")]
    RemoteMissing { role: RemoteRole, name: String },

    /// Fetching from a remote failed (auth, unreachable host, missing repository, timeout).
    #[error("failed to fetch from remote '{remote}': {message}")]
    Fetch { remote: String, message: String },

    #[error("branch '{branch}' not found on remote '{remote}'")]
    BranchNotFound { remote: String, branch: String },

    #[error("no branches found on remote '{remote}'")]
    NoBranchesFound { remote: String },

    /// Pushing a branch failed or the destination rejected the update.
    #[error("failed to push branch '{branch}' to remote '{remote}': {message}")]
    Push {
        remote: String,
        branch: String,
        message: String,
    },

    #[error("repository not found at {}: {reason}", path.display())]
    RepositoryNotFound { path: PathBuf, reason: String },

    #[error("failed to resolve '{reference}': {message}")]
    HashResolution { reference: String, message: String },

    /// Remote setup was requested but no URL could be derived for the role.
    #[error("no {role} URL configured for repository '{repository}'")]
    MissingUrl {
        role: RemoteRole,
        repository: String,
    },

    #[error(transparent)]
    Git(#[from] git2::Error),
}

impl MirrorError {
    /// Stable name of the error kind, used in machine-readable reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RemoteMissing { .. } => "RemoteMissing",
            Self::Fetch { .. } => "FetchError",
            Self::BranchNotFound { .. } => "BranchNotFound",
            Self::NoBranchesFound { .. } => "NoBranchesFound",
            Self::Push { .. } => "PushError",
            Self::RepositoryNotFound { .. } => "RepositoryNotFound",
            Self::HashResolution { .. } => "HashResolutionError",
            Self::MissingUrl { .. } => "MissingUrl",
            Self::Git(_) => "GitError",
        }
    }
}

impl Serialize for MirrorError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("MirrorError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        let err = MirrorError::NoBranchesFound {
            remote: "azure".to_string(),
        };
        assert_eq!(err.kind(), "NoBranchesFound");
        assert_eq!(err.to_string(), "no branches found on remote 'azure'");
    }

    #[test]
    fn serializes_kind_and_message() {
        let err = MirrorError::RemoteMissing {
            role: RemoteRole::Destination,
            name: "github".to_string(),
        };
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["kind"], "RemoteMissing");
        assert_eq!(
            json["message"],
            "destination remote 'github' is not configured"
        );
    }
}
