//! Derived views over a working set: the dependency forest and the
//! missing-dependency reports.

use crate::manifest::ManifestDependency;
use serde::{Deserialize, Serialize};

/// One node of the dependency forest.
///
/// `depth == 0` exactly when `parent_id` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyTreeNode {
    /// Repository id.
    pub id: String,
    /// Distance from the root of this node's tree.
    pub depth: usize,
    /// Id of the node that claimed this one, if any.
    pub parent_id: Option<String>,
    /// Ids of claimed children, in claim order.
    pub child_ids: Vec<String>,
}

impl DependencyTreeNode {
    /// Create a parentless node with no children.
    pub fn root(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            depth: 0,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }

    /// Whether the node is the root of a tree.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// One row of a flattened forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatEntry {
    /// Repository id.
    pub id: String,
    /// Indentation level.
    pub depth: usize,
    /// Id of the parent, shown as the "required by" label.
    pub parent_label: Option<String>,
}

/// Declared dependencies of one repository that are absent from the working set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingDependencyInfo {
    /// Repository whose descriptor declares the dependencies.
    pub owner_id: String,
    /// Declared repository ids not in the working set.
    pub missing_repo_ids: Vec<String>,
    /// Declared file names not in the working set.
    pub missing_file_names: Vec<String>,
}

impl MissingDependencyInfo {
    /// Whether nothing is missing.
    pub fn is_empty(&self) -> bool {
        self.missing_repo_ids.is_empty() && self.missing_file_names.is_empty()
    }
}

/// Manifest-declared dependencies of one file that no present file satisfies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingFileDependencyInfo {
    /// File whose manifest declares the dependencies.
    pub file_name: String,
    /// Declared dependencies with no matching file.
    pub missing_manifest_deps: Vec<ManifestDependency>,
}
