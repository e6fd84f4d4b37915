use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, error, info, info_span, warn};

use crate::error::{MirrorError, MirrorResult};
use crate::git::{GitRepo, TransportOptions};

use super::branches::list_branches;
use super::registry::{ensure_remote, verify_remotes};
use super::{
    BatchReport, Mirror, RemoteNames, RemotePair, RemoteRole, RepositoryReport, VerifyResult,
};

/// What to do in every repository of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    SetupRemotes,
    VerifyRemotes,
    FetchSource,
    ListBranches,
    SyncBranch(String),
    SyncAll,
    VerifyCommits,
    /// Setup remotes, sync every branch, then verify every branch
    FullSync,
}

impl Operation {
    fn configures_remotes(&self) -> bool {
        matches!(self, Self::SetupRemotes | Self::FullSync)
    }
}

/// A repository checkout taking part in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryTarget {
    pub name: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_url: Option<String>,
}

impl RepositoryTarget {
    fn url(&self, role: RemoteRole) -> MirrorResult<&str> {
        let url = match role {
            RemoteRole::Source => self.source_url.as_deref(),
            RemoteRole::Destination => self.destination_url.as_deref(),
        };
        url.ok_or_else(|| MirrorError::MissingUrl {
            role,
            repository: self.name.clone(),
        })
    }
}

/// Settings shared by every repository in a batch.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub remotes: RemoteNames,
    pub transport: TransportOptions,
}

/// Run `operation` against each target in order.
///
/// A failure in one repository is recorded in its report and the batch moves
/// on. `cancel` is checked before each repository; once set, the remaining
/// repositories are not started.
pub fn run_batch(
    targets: &[RepositoryTarget],
    operation: &Operation,
    settings: &BatchSettings,
    cancel: &AtomicBool,
) -> BatchReport {
    let mut repositories = Vec::with_capacity(targets.len());

    for target in targets {
        if cancel.load(Ordering::SeqCst) {
            warn!(
                remaining = targets.len() - repositories.len(),
                "batch cancelled"
            );
            return BatchReport {
                repositories,
                cancelled: true,
            };
        }

        let span = info_span!("repository", name = %target.name);
        let _enter = span.enter();

        let mut report = RepositoryReport::new(target.clone());
        match run_operation(target, operation, settings, &mut report) {
            Ok(()) if report.succeeded() => info!("repository done"),
            Ok(()) => warn!("repository finished with failures"),
            Err(e) => {
                error!(error = %e, kind = e.kind(), "repository failed");
                report.fatal = Some(e);
            }
        }
        repositories.push(report);
    }

    BatchReport {
        repositories,
        cancelled: false,
    }
}

fn run_operation(
    target: &RepositoryTarget,
    operation: &Operation,
    settings: &BatchSettings,
    report: &mut RepositoryReport,
) -> MirrorResult<()> {
    let repo = GitRepo::open(&target.path)?;
    debug!(path = %repo.path().display(), ?operation, "repository opened");

    let remotes = if operation.configures_remotes() {
        setup_remotes(&repo, target, &settings.remotes)?
    } else {
        verify_remotes(&repo, &settings.remotes)?
    };
    report.remotes = Some(remotes.clone());

    let mirror = Mirror::new(&repo, &remotes, settings.transport);
    match operation {
        Operation::SetupRemotes | Operation::VerifyRemotes => {}
        Operation::FetchSource => {
            report.fetch_summary = Some(repo.fetch_prune(&remotes.source.name, &settings.transport)?);
        }
        Operation::ListBranches => {
            report.branches = list_branches(&repo, &remotes.source, &settings.transport)?;
        }
        Operation::SyncBranch(branch) => {
            report.sync.push(mirror.sync_branch(branch)?);
        }
        Operation::SyncAll => {
            report.sync = mirror.sync_all()?;
        }
        Operation::VerifyCommits => {
            report.verify = verify(&mirror)?;
        }
        Operation::FullSync => {
            report.sync = mirror.sync_all()?;
            report.verify = verify(&mirror)?;
        }
    }

    Ok(())
}

fn verify(mirror: &Mirror<'_>) -> MirrorResult<Vec<VerifyResult>> {
    let verification = mirror.verify_all()?;
    if verification.mismatches > 0 {
        warn!(
            mismatches = verification.mismatches,
            total = verification.results.len(),
            "verification found differences"
        );
    } else {
        info!(total = verification.results.len(), "all branches match");
    }
    Ok(verification.results)
}

/// Point both remotes at the URLs configured for `target`.
fn setup_remotes(
    repo: &GitRepo,
    target: &RepositoryTarget,
    names: &RemoteNames,
) -> MirrorResult<RemotePair> {
    // Resolve both URLs first so a half-configured target changes nothing
    let source_url = target.url(RemoteRole::Source)?;
    let destination_url = target.url(RemoteRole::Destination)?;

    Ok(RemotePair {
        source: ensure_remote(repo, RemoteRole::Source, &names.source, source_url)?,
        destination: ensure_remote(
            repo,
            RemoteRole::Destination,
            &names.destination,
            destination_url,
        )?,
    })
}
