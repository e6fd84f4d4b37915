//! Configuration loading.
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. mirror.toml in the working directory, or --config <file>
//! 3. MIRROR__* env vars
//! 4. CLI overrides (--repo, --timeout)
//! ```
//!
//! ```text
//! MIRROR__DEFAULT_BRANCH=develop            → default_branch = "develop"
//! MIRROR__SOURCE__URL_TEMPLATE=git@…/{name} → source.url_template
//! MIRROR__TIMEOUT_SECS=60                   → timeout_secs = 60
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::git::TransportOptions;
use crate::mirror::{BatchSettings, RemoteNames, RepositoryTarget};

pub const DEFAULT_CONFIG_FILE: &str = "mirror.toml";
pub const ENV_PREFIX: &str = "MIRROR";

const DEFAULT_SOURCE_REMOTE: &str = "azure";
const DEFAULT_DESTINATION_REMOTE: &str = "github";
const NAME_PLACEHOLDER: &str = "{name}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    /// Branch used by `sync-branch` when none is given
    pub default_branch: String,
    pub timeout_secs: Option<u64>,
    pub source: RemoteConfig,
    pub destination: RemoteConfig,
    pub repositories: Vec<RepositoryConfig>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            default_branch: "main".to_string(),
            timeout_secs: None,
            source: RemoteConfig::default(),
            destination: RemoteConfig::default(),
            repositories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// Remote name inside each repository
    pub remote: Option<String>,
    /// URL with a `{name}` placeholder for the repository name
    pub url_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub destination_url: Option<String>,
}

impl MirrorConfig {
    /// Load defaults, then the config file, then `MIRROR__*` variables.
    ///
    /// An explicit path must exist; the default `mirror.toml` is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => {
                File::new(&path.to_string_lossy(), FileFormat::Toml).required(true)
            }
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        config::Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Self>()
            .context("Invalid configuration")?
            .validated()
    }

    #[cfg(test)]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        config::Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .context("Failed to parse configuration")?
            .try_deserialize::<Self>()
            .context("Invalid configuration")?
            .validated()
    }

    /// Remote names end up in `refs/remotes/<name>/*` globs, so a name with a
    /// `/` would also match the refs of a remote nested under it.
    fn validated(self) -> Result<Self> {
        let names = self.remote_names();
        for (role, name) in [("source", &names.source), ("destination", &names.destination)] {
            if name.is_empty() || name.contains('/') {
                bail!("{role} remote name '{name}' must be non-empty and must not contain '/'");
            }
        }
        if names.source == names.destination {
            bail!("source and destination remotes are both named '{}'", names.source);
        }
        Ok(self)
    }

    pub fn remote_names(&self) -> RemoteNames {
        RemoteNames {
            source: self
                .source
                .remote
                .clone()
                .unwrap_or_else(|| DEFAULT_SOURCE_REMOTE.to_string()),
            destination: self
                .destination
                .remote
                .clone()
                .unwrap_or_else(|| DEFAULT_DESTINATION_REMOTE.to_string()),
        }
    }

    /// Batch settings, with `timeout_override` taking precedence over the file.
    pub fn batch_settings(&self, timeout_override: Option<u64>) -> BatchSettings {
        let timeout = timeout_override
            .or(self.timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        BatchSettings {
            remotes: self.remote_names(),
            transport: TransportOptions::with_timeout(timeout),
        }
    }

    /// Repositories to process, in order.
    ///
    /// Paths given on the command line replace the configured list; with
    /// neither, the current directory is the only target.
    pub fn targets(&self, cli_paths: &[PathBuf]) -> Vec<RepositoryTarget> {
        if !cli_paths.is_empty() {
            return cli_paths
                .iter()
                .map(|path| self.target(path.clone(), None, None, None))
                .collect();
        }

        if self.repositories.is_empty() {
            return vec![self.target(PathBuf::from("."), None, None, None)];
        }

        self.repositories
            .iter()
            .map(|repo| {
                self.target(
                    repo.path.clone(),
                    repo.name.clone(),
                    repo.source_url.clone(),
                    repo.destination_url.clone(),
                )
            })
            .collect()
    }

    fn target(
        &self,
        path: PathBuf,
        name: Option<String>,
        source_url: Option<String>,
        destination_url: Option<String>,
    ) -> RepositoryTarget {
        let name = name.unwrap_or_else(|| repository_name(&path));
        let expand = |template: &Option<String>| {
            template
                .as_ref()
                .map(|t| t.replace(NAME_PLACEHOLDER, &name))
        };

        RepositoryTarget {
            source_url: source_url.or_else(|| expand(&self.source.url_template)),
            destination_url: destination_url.or_else(|| expand(&self.destination.url_template)),
            name,
            path,
        }
    }
}

/// Directory name of `path`, resolving `.` and `..` through the filesystem.
fn repository_name(path: &Path) -> String {
    let file_name = |p: &Path| {
        p.file_name()
            .map(|name| name.to_string_lossy().into_owned())
    };

    file_name(path)
        .filter(|name| name != "." && name != "..")
        .or_else(|| path.canonicalize().ok().and_then(|p| file_name(&p)))
        .unwrap_or_else(|| path.display().to_string())
}
