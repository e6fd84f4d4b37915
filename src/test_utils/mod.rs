#[cfg(test)]
pub mod mirror_fixture;

#[cfg(test)]
pub mod repo_extensions;

#[cfg(test)]
pub use mirror_fixture::{url_of, MirrorFixture, DESTINATION, SOURCE};

#[cfg(test)]
pub use repo_extensions::{create_test_repo, RepoTestOperations};
