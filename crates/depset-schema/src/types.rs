//! Working-set entries and repository descriptors.

use crate::hash::ContentHash;
use crate::repo::{IdentifierError, RepoId, canonical_id};
use serde::{Deserialize, Serialize};

/// Version constraint given to dependencies that do not declare one.
pub const DEFAULT_VERSION_CONSTRAINT: &str = "latest";

/// Project scope given to dependencies that do not declare one.
pub const DEFAULT_PROJECT_SCOPE: &str = "*";

fn default_version_constraint() -> String {
    DEFAULT_VERSION_CONSTRAINT.to_string()
}

fn default_project_scope() -> String {
    DEFAULT_PROJECT_SCOPE.to_string()
}

/// Which kind of release of a dependency repository should be consumed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ReleaseChannel {
    /// Published releases only (default).
    #[default]
    Release,
    /// Releases marked as prerelease.
    Prerelease,
    /// Unpublished draft releases.
    Draft,
    /// The most recent CI build, released or not.
    LatestBuild,
}

impl ReleaseChannel {
    /// Return the wire name of the channel.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Prerelease => "prerelease",
            Self::Draft => "draft",
            Self::LatestBuild => "latestBuild",
        }
    }
}

impl std::fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReleaseChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "release" => Ok(Self::Release),
            "prerelease" => Ok(Self::Prerelease),
            "draft" => Ok(Self::Draft),
            "latestbuild" | "latest-build" => Ok(Self::LatestBuild),
            other => Err(format!(
                "Unknown release channel '{other}': expected release, prerelease, draft or latestBuild"
            )),
        }
    }
}

/// A dependency on another repository.
///
/// Identity is [`RepoDependency::id`]; everything else is descriptive
/// metadata supplied by the caller for explicit roots, or by the declaring
/// descriptor for discovered dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoDependency {
    /// Canonical `owner/name`, or the raw reference when it cannot be parsed.
    pub id: String,

    /// Version requirement (e.g. `latest`, `18.0`).
    #[serde(default = "default_version_constraint")]
    pub version_constraint: String,

    /// Release channel to consume.
    #[serde(default)]
    pub release_channel: ReleaseChannel,

    /// Name of the secret holding access credentials, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_secret_ref: Option<String>,

    /// Which projects of the dependency repository to consume.
    #[serde(default = "default_project_scope")]
    pub project_scope: String,
}

impl RepoDependency {
    /// Create a dependency with default metadata.
    ///
    /// The reference is normalized to `owner/name` when possible.
    pub fn new(reference: &str) -> Self {
        Self {
            id: canonical_id(reference),
            version_constraint: default_version_constraint(),
            release_channel: ReleaseChannel::default(),
            auth_secret_ref: None,
            project_scope: default_project_scope(),
        }
    }

    /// Set the version constraint.
    pub fn with_version(mut self, constraint: impl Into<String>) -> Self {
        self.version_constraint = constraint.into();
        self
    }

    /// Set the release channel.
    pub fn with_channel(mut self, channel: ReleaseChannel) -> Self {
        self.release_channel = channel;
        self
    }

    /// Parse the id as a canonical repository reference.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] for dangling references that cannot be
    /// expanded.
    pub fn repo_id(&self) -> Result<RepoId, IdentifierError> {
        RepoId::parse(&self.id)
    }
}

/// A dependency on a binary package file.
///
/// Identity is [`FileDependency::name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDependency {
    /// File name, e.g. `BaseApp_18.0.0.0.app`.
    pub name: String,

    /// Location of the file (URL or repository path).
    pub path: String,

    /// SHA256 of the contents, or pending when not yet downloaded.
    #[serde(default)]
    pub content_hash: ContentHash,

    /// Size of the contents in bytes (0 while pending).
    #[serde(default)]
    pub size_bytes: u64,
}

impl FileDependency {
    /// Create a file dependency whose contents are not known yet.
    pub fn pending(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content_hash: ContentHash::Pending,
            size_bytes: 0,
        }
    }

    /// Create a file dependency from its contents.
    pub fn from_bytes(name: impl Into<String>, path: impl Into<String>, data: &[u8]) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content_hash: ContentHash::compute(data),
            size_bytes: data.len() as u64,
        }
    }
}

/// The directly-declared dependencies of one repository.
///
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoDescriptor {
    /// Id of the repository this descriptor belongs to.
    pub id: String,

    /// Repositories this one depends on.
    #[serde(default)]
    pub repo_dependencies: Vec<RepoDependency>,

    /// Binary packages this one depends on.
    #[serde(default)]
    pub file_dependencies: Vec<FileDependency>,
}

impl RepoDescriptor {
    /// Create a descriptor with no dependencies.
    pub fn leaf(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            repo_dependencies: Vec::new(),
            file_dependencies: Vec::new(),
        }
    }

    /// Create a descriptor declaring the given repositories with default metadata.
    pub fn with_repos<I, S>(id: impl Into<String>, repos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: id.into(),
            repo_dependencies: repos
                .into_iter()
                .map(|r| RepoDependency::new(r.as_ref()))
                .collect(),
            file_dependencies: Vec::new(),
        }
    }
}
