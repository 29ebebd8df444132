//! Sources of repository descriptors.
//!
//! A [`DescriptorFetcher`] is the only way the engine learns what a
//! repository depends on. Failures are per repository and never fatal.

#[cfg(feature = "network")]
pub mod github;
pub mod local;
pub mod settings;

use crate::error::FetchError;
use async_trait::async_trait;
use depset_schema::{RepoDescriptor, RepoId};

#[cfg(feature = "network")]
pub use github::GitHubFetcher;
pub use local::{DirectoryFetcher, StaticFetcher};
pub use settings::RepoSettings;

/// A service that reports the directly-declared dependencies of a repository.
#[async_trait]
pub trait DescriptorFetcher: Send + Sync {
    /// Identifier of this source (e.g. "github:https://api.github.com").
    fn key(&self) -> String;

    /// Fetch the descriptor for `id`.
    async fn fetch(&self, id: &RepoId) -> Result<RepoDescriptor, FetchError>;
}
