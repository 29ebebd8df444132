//! Dependency resolution engine for repository-based projects.
//!
//! A [`Session`] holds a working set of repository and file dependencies.
//! Adding roots walks the repository graph breadth-first through a
//! [`DescriptorFetcher`]; every mutation re-derives the dependency forest and
//! the missing-dependency reports.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod file_manifest;
pub mod manifest;
pub mod missing;
pub mod resolver;
pub mod session;
pub mod tree;
pub mod working_set;

pub use cache::{DescriptorCache, ManifestCache, ManifestState};
pub use config::EngineConfig;
pub use error::{FetchError, ParseError, SessionError};
pub use fetcher::{DescriptorFetcher, DirectoryFetcher, RepoSettings, StaticFetcher};
#[cfg(feature = "network")]
pub use fetcher::GitHubFetcher;
pub use file_manifest::{FileMissingMap, file_satisfies};
pub use manifest::{ManifestParser, NavxManifestParser};
pub use missing::MissingMap;
pub use resolver::{GraphResolver, Resolution};
pub use session::{CancelHandle, FileBatchReport, FileOutcome, FileUpload, ResolveReport, Session};
pub use tree::{Forest, build_forest, flatten};
pub use working_set::WorkingSet;

/// User Agent string for descriptor requests
pub const USER_AGENT: &str = concat!("depset-core/", env!("CARGO_PKG_VERSION"));
