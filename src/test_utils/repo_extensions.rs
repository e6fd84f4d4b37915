use std::path::Path;

use anyhow::{Context, Error};
use git2::{Oid, Signature};

use crate::git::GitRepo;

/// Create a new temporary working repository for testing
pub fn create_test_repo() -> (assert_fs::TempDir, GitRepo) {
    let temp_dir = assert_fs::TempDir::new().unwrap();
    let repo = GitRepo::init(temp_dir.path()).unwrap();
    (temp_dir, repo)
}

/// Test-only helpers for building history and inspecting refs
pub trait RepoTestOperations {
    /// Write `filename` and commit it on `branch`, creating the branch if needed.
    fn commit_file(
        &self,
        branch: &str,
        filename: &str,
        content: &str,
        message: &str,
    ) -> Result<Oid, Error>;

    /// Point `branch` at the tip of `from` unless it already exists
    fn fork_branch(&self, branch: &str, from: &str) -> Result<(), Error>;

    /// Push `refspec` straight to another repository on disk
    fn push_to(&self, other: &GitRepo, refspec: &str) -> Result<(), Error>;

    /// Tip of `refs/heads/<branch>`
    fn branch_tip(&self, branch: &str) -> Option<Oid>;

    /// Tip of `refs/remotes/<remote>/<branch>`
    fn tracking_tip(&self, remote: &str, branch: &str) -> Option<Oid>;

    fn delete_branch_ref(&self, branch: &str);
}

fn tip_of(repo: &GitRepo, refname: &str) -> Option<Oid> {
    repo.repo()
        .find_reference(refname)
        .ok()
        .and_then(|r| r.peel_to_commit().ok())
        .map(|c| c.id())
}

impl RepoTestOperations for GitRepo {
    fn commit_file(
        &self,
        branch: &str,
        filename: &str,
        content: &str,
        message: &str,
    ) -> Result<Oid, Error> {
        let repo = self.repo();
        std::fs::write(self.path().join(filename), content)
            .context(format!("Failed to write '{filename}'"))?;

        let mut index = repo.index().context("Failed to get repository index")?;
        index.add_path(Path::new(filename))?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;

        let refname = format!("refs/heads/{branch}");
        let parent = repo
            .find_reference(&refname)
            .ok()
            .and_then(|r| r.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let signature = Signature::now("Test User", "test@example.com")?;
        let oid = repo
            .commit(Some(refname.as_str()), &signature, &signature, message, &tree, &parents)
            .context("Failed to create commit")?;

        Ok(oid)
    }

    fn fork_branch(&self, branch: &str, from: &str) -> Result<(), Error> {
        if self.branch_tip(branch).is_some() {
            return Ok(());
        }
        let commit = self
            .repo()
            .find_reference(&format!("refs/heads/{from}"))?
            .peel_to_commit()?;
        self.repo().branch(branch, &commit, false)?;
        Ok(())
    }

    fn push_to(&self, other: &GitRepo, refspec: &str) -> Result<(), Error> {
        let url = other
            .path()
            .to_str()
            .context("Failed to convert repository path to string")?;
        let mut remote = self.repo().remote_anonymous(url)?;
        remote
            .push(&[refspec], None)
            .context(format!("Failed to push '{refspec}'"))?;
        Ok(())
    }

    fn branch_tip(&self, branch: &str) -> Option<Oid> {
        tip_of(self, &format!("refs/heads/{branch}"))
    }

    fn tracking_tip(&self, remote: &str, branch: &str) -> Option<Oid> {
        tip_of(self, &format!("refs/remotes/{remote}/{branch}"))
    }

    fn delete_branch_ref(&self, branch: &str) {
        self.repo()
            .find_reference(&format!("refs/heads/{branch}"))
            .unwrap()
            .delete()
            .unwrap();
    }
}
