use tracing::{debug, info};

use crate::error::{MirrorError, MirrorResult};
use crate::git::GitRepo;

use super::{Remote, RemoteNames, RemotePair, RemoteRole};

/// Bind remote `name` to `url`, replacing any previous binding.
///
/// Calling it twice with the same arguments leaves a single remote behind.
pub fn ensure_remote(
    repo: &GitRepo,
    role: RemoteRole,
    name: &str,
    url: &str,
) -> MirrorResult<Remote> {
    repo.replace_remote(name, url)?;
    info!(%role, remote = name, url, "remote configured");

    Ok(Remote {
        name: name.to_string(),
        url: url.to_string(),
        role,
    })
}

/// Resolve both remotes from the repository configuration.
pub fn verify_remotes(repo: &GitRepo, names: &RemoteNames) -> MirrorResult<RemotePair> {
    let resolve = |role: RemoteRole| -> MirrorResult<Remote> {
        let name = names.get(role);
        match repo.find_remote_url(name)? {
            Some(url) => {
                debug!(%role, remote = name, %url, "remote present");
                Ok(Remote {
                    name: name.to_string(),
                    url,
                    role,
                })
            }
            None => {
                let available: Vec<String> =
                    repo.get_remotes()?.into_iter().map(|r| r.name).collect();
                debug!(%role, remote = name, ?available, "remote missing");
                Err(MirrorError::RemoteMissing {
                    role,
                    name: name.to_string(),
                })
            }
        }
    };

    Ok(RemotePair {
        source: resolve(RemoteRole::Source)?,
        destination: resolve(RemoteRole::Destination)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::repository::core::RemoteInfo;
    use crate::test_utils::{create_test_repo, MirrorFixture};

    #[test]
    fn ensure_remote_is_idempotent() {
        let (_dir, repo) = create_test_repo();

        let first = ensure_remote(&repo, RemoteRole::Source, "azure", "ssh://azure/repo").unwrap();
        let second = ensure_remote(&repo, RemoteRole::Source, "azure", "ssh://azure/repo").unwrap();

        assert_eq!(first, second);
        assert_eq!(
            repo.get_remotes().unwrap(),
            vec![RemoteInfo {
                name: "azure".to_string(),
                url: "ssh://azure/repo".to_string()
            }]
        );
    }

    #[test]
    fn ensure_remote_replaces_stale_url() {
        let (_dir, repo) = create_test_repo();

        ensure_remote(&repo, RemoteRole::Destination, "github", "ssh://old").unwrap();
        ensure_remote(&repo, RemoteRole::Destination, "github", "ssh://new").unwrap();

        let remotes = repo.get_remotes().unwrap();
        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].url, "ssh://new");
    }

    #[test]
    fn verify_remotes_returns_configured_pair() {
        let fixture = MirrorFixture::new();

        let pair = verify_remotes(&fixture.mirror, &MirrorFixture::remote_names()).unwrap();

        assert_eq!(pair, fixture.remotes());
    }

    #[test]
    fn verify_remotes_reports_missing_destination() {
        let (_dir, repo) = create_test_repo();
        ensure_remote(&repo, RemoteRole::Source, "azure", "ssh://azure/repo").unwrap();

        let result = verify_remotes(&repo, &MirrorFixture::remote_names());

        match result {
            Err(MirrorError::RemoteMissing { role, name }) => {
                assert_eq!(role, RemoteRole::Destination);
                assert_eq!(name, "github");
            }
            other => panic!("expected RemoteMissing, got {other:?}"),
        }
    }

    #[test]
    fn verify_remotes_reports_missing_source_first() {
        let (_dir, repo) = create_test_repo();

        let result = verify_remotes(&repo, &MirrorFixture::remote_names());

        assert!(matches!(
            result,
            Err(MirrorError::RemoteMissing {
                role: RemoteRole::Source,
                ..
            })
        ));
    }
}
