use std::path::{Path, PathBuf};

use git2::Repository;

use crate::error::{MirrorError, MirrorResult};

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteInfo {
    pub name: String,
    pub url: String,
}

/// Handle to one repository on disk.
///
/// Every operation goes through an explicit handle; nothing depends on the
/// process working directory.
pub struct GitRepo {
    path: PathBuf,
    repo: Repository,
}

impl GitRepo {
    /// Open a git repository at the specified path
    pub fn open<P: AsRef<Path>>(path: P) -> MirrorResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MirrorError::RepositoryNotFound {
                path: path.to_path_buf(),
                reason: "directory does not exist".to_string(),
            });
        }

        let repo = Repository::open(path).map_err(|e| MirrorError::RepositoryNotFound {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    #[cfg(test)]
    pub fn init<P: AsRef<Path>>(path: P) -> MirrorResult<Self> {
        let path_ref = path.as_ref();
        let repo = Repository::init(path_ref)?;

        // Pin HEAD so tests don't depend on init.defaultBranch
        repo.set_head("refs/heads/master")?;

        Ok(Self {
            path: path_ref.to_path_buf(),
            repo,
        })
    }

    #[cfg(test)]
    pub fn init_bare<P: AsRef<Path>>(path: P) -> MirrorResult<Self> {
        let path_ref = path.as_ref();
        let repo = Repository::init_bare(path_ref)?;
        repo.set_head("refs/heads/master")?;

        Ok(Self {
            path: path_ref.to_path_buf(),
            repo,
        })
    }

    /// Get the path to the repository
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get access to the internal git2 Repository
    pub(crate) fn repo(&self) -> &Repository {
        &self.repo
    }
}
