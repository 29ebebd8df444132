//! Session-scoped caches for fetched descriptors and parsed manifests.

use crate::error::ParseError;
use depset_schema::{AppFileManifest, RepoDescriptor};
use indexmap::IndexMap;
use tracing::warn;

/// Descriptors by repository id.
///
/// Entries are write-once: a second descriptor for an id already cached is
/// dropped, so a fetched descriptor never changes under the forest built from
/// it.
#[derive(Debug, Clone, Default)]
pub struct DescriptorCache {
    entries: IndexMap<String, RepoDescriptor>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache `descriptor` under its id.
    ///
    /// Returns `false` without touching the cache when the id is already
    /// present.
    pub fn insert(&mut self, descriptor: RepoDescriptor) -> bool {
        if self.entries.contains_key(&descriptor.id) {
            warn!(repo = %descriptor.id, "descriptor already cached, keeping the first one");
            return false;
        }
        self.entries.insert(descriptor.id.clone(), descriptor);
        true
    }

    pub fn get(&self, id: &str) -> Option<&RepoDescriptor> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of reading one file's manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestState {
    Parsed(AppFileManifest),
    Failed(ParseError),
}

impl ManifestState {
    pub fn manifest(&self) -> Option<&AppFileManifest> {
        match self {
            Self::Parsed(manifest) => Some(manifest),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ParseError> {
        match self {
            Self::Parsed(_) => None,
            Self::Failed(err) => Some(err),
        }
    }
}

/// Manifest read outcomes by file name.
pub type ManifestCache = IndexMap<String, ManifestState>;
