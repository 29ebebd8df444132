//! Repository settings documents.
//!
//! A repository declares its dependencies in a JSON settings file
//! (`.AL-Go/settings.json` by default). Only the two dependency keys are read;
//! everything else in the document is ignored.

use crate::error::FetchError;
use depset_schema::types::{DEFAULT_PROJECT_SCOPE, DEFAULT_VERSION_CONSTRAINT};
use depset_schema::{FileDependency, ReleaseChannel, RepoDependency, RepoDescriptor};
use serde::Deserialize;

/// Default location of the settings document inside a repository.
pub const DEFAULT_SETTINGS_PATH: &str = ".AL-Go/settings.json";

fn default_version() -> String {
    DEFAULT_VERSION_CONSTRAINT.to_string()
}

fn default_projects() -> String {
    DEFAULT_PROJECT_SCOPE.to_string()
}

/// The dependency-related subset of a repository settings document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSettings {
    /// Repositories probed for dependency artifacts.
    #[serde(default)]
    pub app_dependency_probing_paths: Vec<ProbingPath>,

    /// Binary packages referenced by URL or path.
    #[serde(default)]
    pub app_dependencies: Vec<String>,
}

/// One entry of `appDependencyProbingPaths`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbingPath {
    pub repo: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub release_status: ReleaseChannel,

    #[serde(default = "default_projects")]
    pub projects: String,

    #[serde(default, rename = "AuthTokenSecret")]
    pub auth_token_secret: Option<String>,
}

impl From<ProbingPath> for RepoDependency {
    fn from(path: ProbingPath) -> Self {
        let mut dep = RepoDependency::new(&path.repo)
            .with_version(path.version)
            .with_channel(path.release_status);
        dep.project_scope = path.projects;
        dep.auth_secret_ref = path.auth_token_secret.filter(|s| !s.is_empty());
        dep
    }
}

impl RepoSettings {
    /// Parse a settings document fetched for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Malformed`] if `text` is not a JSON object of the
    /// expected shape.
    pub fn parse(id: &str, text: &str) -> Result<Self, FetchError> {
        let text = text.trim_start_matches('\u{feff}');
        serde_json::from_str(text).map_err(|e| FetchError::malformed(id, e))
    }

    /// Convert into the descriptor of repository `id`.
    pub fn into_descriptor(self, id: impl Into<String>) -> RepoDescriptor {
        let repo_dependencies = self
            .app_dependency_probing_paths
            .into_iter()
            .filter(|p| !p.repo.trim().is_empty())
            .map(RepoDependency::from)
            .collect();

        let file_dependencies = self
            .app_dependencies
            .into_iter()
            .filter(|location| !location.trim().is_empty())
            .map(|location| FileDependency::pending(file_name_of(&location), location))
            .collect();

        RepoDescriptor {
            id: id.into(),
            repo_dependencies,
            file_dependencies,
        }
    }
}

/// Last path segment of a URL or path, without query string.
fn file_name_of(location: &str) -> String {
    let trimmed = location.trim();
    let without_query = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    without_query
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(trimmed)
        .to_string()
}
