use tracing::{debug, info};

use crate::error::MirrorResult;
use crate::git::{GitRepo, TransportOptions};

use super::Remote;

/// Fetch `remote` with pruning and list the branches it has right now.
///
/// Nothing is cached: each call goes back to the network.
pub fn list_branches(
    repo: &GitRepo,
    remote: &Remote,
    transport: &TransportOptions,
) -> MirrorResult<Vec<String>> {
    let summary = repo.fetch_prune(&remote.name, transport)?;
    debug!(remote = %remote.name, %summary, "fetch finished");

    let branches = repo.remote_tracking_branches(&remote.name)?;
    info!(remote = %remote.name, count = branches.len(), "branches enumerated");

    Ok(branches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MirrorError;
    use crate::test_utils::{MirrorFixture, SOURCE};

    #[test]
    fn list_branches_reflects_current_remote_state() {
        let fixture = MirrorFixture::new();
        let remotes = fixture.remotes();
        let options = TransportOptions::default();
        fixture.publish("main", "README.md", "hello");

        assert_eq!(
            list_branches(&fixture.mirror, &remotes.source, &options).unwrap(),
            vec!["main"]
        );

        fixture.publish("hotfix", "fix.txt", "patch");
        assert_eq!(
            list_branches(&fixture.mirror, &remotes.source, &options).unwrap(),
            vec!["hotfix", "main"]
        );
    }

    #[test]
    fn list_branches_of_empty_remote_is_empty() {
        let fixture = MirrorFixture::new();

        let branches =
            list_branches(&fixture.mirror, &fixture.remotes().source, &TransportOptions::default())
                .unwrap();

        assert!(branches.is_empty());
    }

    #[test]
    fn list_branches_surfaces_fetch_errors() {
        let fixture = MirrorFixture::new();
        let missing = fixture.workspace().join("moved-away");
        fixture
            .mirror
            .replace_remote(SOURCE, missing.to_str().unwrap())
            .unwrap();

        let result =
            list_branches(&fixture.mirror, &fixture.remotes().source, &TransportOptions::default());

        assert!(matches!(result, Err(MirrorError::Fetch { .. })));
    }
}
