//! Git operations module
//!
//! Thin, typed wrappers over `git2` grouped by concern:
//!
//! - `repository`: Opening repositories on disk
//! - `remotes`: Remote configuration, fetch with prune, forced push
//! - `branches`: Remote-tracking branch listing and commit resolution

pub mod branches;
pub mod remotes;
pub mod repository;

// Re-export the main types
pub use branches::tracking::tracking_ref;
pub use remotes::transport::TransportOptions;
pub use repository::core::GitRepo;
