use git2::ErrorCode;

use crate::error::MirrorResult;
use crate::git::repository::core::{GitRepo, RemoteInfo};

impl GitRepo {
    /// Bind `name` to `url`, dropping whatever remote had that name before.
    ///
    /// Deleting a remote also drops its remote-tracking refs; the next fetch
    /// recreates them.
    pub fn replace_remote(&self, name: &str, url: &str) -> MirrorResult<()> {
        if self.repo().find_remote(name).is_ok() {
            match self.repo().remote_delete(name) {
                Ok(()) => {}
                Err(e) if e.code() == ErrorCode::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.repo().remote(name, url)?;

        Ok(())
    }

    /// List all remotes with their URLs
    pub fn get_remotes(&self) -> MirrorResult<Vec<RemoteInfo>> {
        let remotes = self.repo().remotes()?;

        let mut remote_infos = Vec::new();
        for name in remotes.iter().flatten() {
            let remote = self.repo().find_remote(name)?;
            let url = remote.url().unwrap_or("<no url>").to_string();

            remote_infos.push(RemoteInfo {
                name: name.to_string(),
                url,
            });
        }

        Ok(remote_infos)
    }

    /// URL of the remote called `name`, or `None` if no such remote exists
    pub fn find_remote_url(&self, name: &str) -> MirrorResult<Option<String>> {
        match self.repo().find_remote(name) {
            Ok(remote) => Ok(remote.url().map(str::to_string)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        git::{repository::core::RemoteInfo, GitRepo},
        test_utils::create_test_repo,
    };

    #[test]
    fn replace_remote_adds_missing_remote() {
        let (_dir, repo) = create_test_repo();
        assert_eq!(repo.get_remotes().unwrap().len(), 0);

        repo.replace_remote("azure", "https://url1").unwrap();

        assert_eq!(
            repo.get_remotes().unwrap(),
            vec![RemoteInfo {
                name: "azure".to_string(),
                url: "https://url1".to_string()
            }]
        );
    }

    #[test]
    fn replace_remote_overwrites_url() {
        let (_dir, repo) = create_test_repo();

        repo.replace_remote("azure", "https://url1").unwrap();
        repo.replace_remote("azure", "https://url2").unwrap();

        assert_eq!(
            repo.get_remotes().unwrap(),
            vec![RemoteInfo {
                name: "azure".to_string(),
                url: "https://url2".to_string()
            }]
        );
    }

    #[test]
    fn get_remotes_lists_every_remote() {
        let (_dir, repo) = create_test_repo();

        repo.replace_remote("azure", "https://url1").unwrap();
        repo.replace_remote("github", "https://url2").unwrap();
        let names: Vec<String> = repo
            .get_remotes()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();

        assert_eq!(names, vec!["azure", "github"]);
    }

    #[test]
    fn find_remote_url_returns_none_for_unknown_remote() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let repo = GitRepo::init(temp_dir.path()).unwrap();

        assert_eq!(repo.find_remote_url("github").unwrap(), None);

        repo.replace_remote("github", "git@github.com:org/repo.git")
            .unwrap();
        assert_eq!(
            repo.find_remote_url("github").unwrap().as_deref(),
            Some("git@github.com:org/repo.git")
        );
    }
}
