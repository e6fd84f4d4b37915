use std::cell::RefCell;
use std::ffi::c_int;
use std::time::{Duration, Instant};

use git2::{AutotagOption, FetchOptions, FetchPrune, PushOptions, RemoteCallbacks};
use tracing::debug;

use crate::error::{MirrorError, MirrorResult};
use crate::git::repository::core::GitRepo;

/// libgit2 keeps asking for credentials while the server rejects them.
const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

/// Limits applied to each network operation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransportOptions {
    pub timeout: Option<Duration>,
}

impl TransportOptions {
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Apply the timeout to libgit2's socket connect and read calls.
    ///
    /// Progress callbacks never run while a server is silent, so this is what
    /// bounds a stalled connect or handshake. The setting is process-wide;
    /// call it once before any transport starts.
    pub fn install_server_timeouts(&self) -> MirrorResult<()> {
        let Some(timeout) = self.timeout else {
            return Ok(());
        };
        let millis = c_int::try_from(timeout.as_millis()).unwrap_or(c_int::MAX);

        // SAFETY: only writes libgit2's global option table; no transport is
        // running yet when this is called.
        unsafe {
            git2::opts::set_server_connect_timeout_in_milliseconds(millis)?;
            git2::opts::set_server_timeout_in_milliseconds(millis)?;
        }
        debug!(timeout_ms = millis, "server timeouts installed");
        Ok(())
    }

    fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|timeout| Instant::now() + timeout)
    }

    /// Describe a transport failure, preferring the timeout when it fired.
    fn describe(&self, deadline: Option<Instant>, error: &git2::Error) -> String {
        match (self.timeout, deadline) {
            (Some(timeout), Some(deadline)) if Instant::now() >= deadline => {
                format!("timed out after {}s", timeout.as_secs_f64())
            }
            _ => error.message().to_string(),
        }
    }
}

/// Callbacks shared by fetch and push: credentials from the SSH agent or the
/// git credential helper, and a deadline check from the progress callbacks.
/// A silent server is bounded by [`TransportOptions::install_server_timeouts`].
fn remote_callbacks<'a>(
    config: Option<git2::Config>,
    deadline: Option<Instant>,
) -> RemoteCallbacks<'a> {
    let mut attempts = 0;
    let mut callbacks = RemoteCallbacks::new();

    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(
                "authentication failed: credentials were rejected",
            ));
        }

        if allowed.is_ssh_key() {
            if let Some(user) = username_from_url {
                return git2::Cred::ssh_key_from_agent(user);
            }
        }
        if allowed.is_user_pass_plaintext() {
            if let Some(cfg) = config.as_ref() {
                if let Ok(cred) = git2::Cred::credential_helper(cfg, url, username_from_url) {
                    return Ok(cred);
                }
            }
        }
        git2::Cred::default()
    });

    let within_deadline = move || deadline.map_or(true, |d| Instant::now() < d);
    callbacks.transfer_progress(move |_| within_deadline());
    callbacks.sideband_progress(move |_| within_deadline());
    callbacks.push_negotiation(move |_| {
        if within_deadline() {
            Ok(())
        } else {
            Err(git2::Error::from_str("deadline exceeded before push"))
        }
    });

    callbacks
}

impl GitRepo {
    /// Fetch every branch of `remote_name` with pruning, so remote-tracking
    /// refs for branches deleted upstream disappear.
    pub fn fetch_prune(&self, remote_name: &str, options: &TransportOptions) -> MirrorResult<String> {
        let fetch_error = |message: String| MirrorError::Fetch {
            remote: remote_name.to_string(),
            message,
        };

        let mut remote = self
            .repo()
            .find_remote(remote_name)
            .map_err(|e| fetch_error(e.message().to_string()))?;

        let refspecs: Vec<String> = remote
            .fetch_refspecs()?
            .iter()
            .flatten()
            .map(str::to_string)
            .collect();
        let refspecs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();

        let deadline = options.deadline();
        let mut fetch_options = FetchOptions::new();
        fetch_options
            .remote_callbacks(remote_callbacks(self.repo().config().ok(), deadline))
            .prune(FetchPrune::On)
            .download_tags(AutotagOption::None);

        debug!(remote = remote_name, ?refspecs, "fetching");
        remote
            .fetch(&refspecs, Some(&mut fetch_options), None)
            .map_err(|e| fetch_error(options.describe(deadline, &e)))?;

        let stats = remote.stats();
        let received_objects = stats.received_objects();
        let total_objects = stats.total_objects();

        if received_objects > 0 {
            Ok(format!(
                "Fetched {received_objects}/{total_objects} objects from {remote_name}"
            ))
        } else {
            Ok("Already up-to-date".to_string())
        }
    }

    /// Force-push `source_ref` to `refs/heads/<branch>` on `remote_name`.
    ///
    /// The destination ref is overwritten unconditionally; commits that only
    /// exist there are dropped from the branch.
    pub fn push_force(
        &self,
        remote_name: &str,
        source_ref: &str,
        branch: &str,
        options: &TransportOptions,
    ) -> MirrorResult<()> {
        let push_error = |message: String| MirrorError::Push {
            remote: remote_name.to_string(),
            branch: branch.to_string(),
            message,
        };

        let mut remote = self
            .repo()
            .find_remote(remote_name)
            .map_err(|e| push_error(e.message().to_string()))?;

        let refspec = format!("+{source_ref}:refs/heads/{branch}");
        let rejection: RefCell<Option<String>> = RefCell::new(None);
        let deadline = options.deadline();

        {
            let mut callbacks = remote_callbacks(self.repo().config().ok(), deadline);
            callbacks.push_update_reference(|_ref_name, status| {
                if let Some(msg) = status {
                    *rejection.borrow_mut() = Some(msg.to_string());
                }
                Ok(())
            });

            let mut push_options = PushOptions::new();
            push_options.remote_callbacks(callbacks);

            debug!(remote = remote_name, %refspec, "pushing");
            remote
                .push(&[refspec.as_str()], Some(&mut push_options))
                .map_err(|e| push_error(options.describe(deadline, &e)))?;
        }

        if let Some(message) = rejection.into_inner() {
            return Err(push_error(format!("rejected by remote: {message}")));
        }

        Ok(())
    }
}
