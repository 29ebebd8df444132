//! Shared data model for depset.
//!
//! These types describe a working set of build dependencies (repositories and
//! binary packages), the descriptors and manifests they are discovered from,
//! and the derived forest and missing-dependency reports. They carry no
//! behavior beyond validation and are shared by the engine and the CLI.

pub mod hash;
pub mod manifest;
pub mod repo;
pub mod report;
pub mod types;

// Re-exports
pub use hash::ContentHash;
pub use manifest::{AppFileManifest, ManifestDependency};
pub use repo::{IdentifierError, RepoId, canonical_id};
pub use report::{DependencyTreeNode, FlatEntry, MissingDependencyInfo, MissingFileDependencyInfo};
pub use types::*;
