use std::path::{Path, PathBuf};

use git2::Oid;

use crate::git::GitRepo;
use crate::mirror::{Remote, RemoteNames, RemotePair, RemoteRole};

use super::repo_extensions::RepoTestOperations;

pub const SOURCE: &str = "azure";
pub const DESTINATION: &str = "github";

/// Four repositories wired together the way a real mirror is:
///
/// - `author` commits and publishes history
/// - `source` and `destination` are bare repositories standing in for the hosts
/// - `mirror` is the checkout the tool operates on, with both remotes configured
pub struct MirrorFixture {
    root: assert_fs::TempDir,
    pub author: GitRepo,
    pub source: GitRepo,
    pub destination: GitRepo,
    pub mirror: GitRepo,
}

impl MirrorFixture {
    pub fn new() -> Self {
        let root = assert_fs::TempDir::new().unwrap();
        let author = GitRepo::init(root.path().join("author")).unwrap();
        let source = GitRepo::init_bare(root.path().join("source.git")).unwrap();
        let destination = GitRepo::init_bare(root.path().join("destination.git")).unwrap();
        let mirror = GitRepo::init(root.path().join("mirror")).unwrap();

        mirror
            .replace_remote(SOURCE, &url_of(&source))
            .unwrap();
        mirror
            .replace_remote(DESTINATION, &url_of(&destination))
            .unwrap();

        Self {
            root,
            author,
            source,
            destination,
            mirror,
        }
    }

    /// Directory holding every fixture repository
    pub fn workspace(&self) -> &Path {
        self.root.path()
    }

    pub fn mirror_path(&self) -> PathBuf {
        self.mirror.path().to_path_buf()
    }

    /// Commit on `branch` in the author repo and force-push it to the source.
    pub fn publish(&self, branch: &str, filename: &str, content: &str) -> Oid {
        let oid = self
            .author
            .commit_file(branch, filename, content, &format!("Update {filename}"))
            .unwrap();
        self.author
            .push_to(&self.source, &format!("+refs/heads/{branch}:refs/heads/{branch}"))
            .unwrap();
        oid
    }

    /// Push a commit that only the destination has, bypassing the mirror.
    pub fn publish_to_destination(&self, branch: &str, filename: &str, content: &str) -> Oid {
        let local = format!("destination-only/{branch}");
        if self.author.branch_tip(branch).is_some() {
            self.author.fork_branch(&local, branch).unwrap();
        }
        let oid = self
            .author
            .commit_file(&local, filename, content, "Destination-only change")
            .unwrap();
        self.author
            .push_to(&self.destination, &format!("+refs/heads/{local}:refs/heads/{branch}"))
            .unwrap();
        oid
    }

    pub fn remote_names() -> RemoteNames {
        RemoteNames {
            source: SOURCE.to_string(),
            destination: DESTINATION.to_string(),
        }
    }

    pub fn remotes(&self) -> RemotePair {
        RemotePair {
            source: Remote {
                name: SOURCE.to_string(),
                url: url_of(&self.source),
                role: RemoteRole::Source,
            },
            destination: Remote {
                name: DESTINATION.to_string(),
                url: url_of(&self.destination),
                role: RemoteRole::Destination,
            },
        }
    }
}

pub fn url_of(repo: &GitRepo) -> String {
    repo.path().to_str().unwrap().to_string()
}
