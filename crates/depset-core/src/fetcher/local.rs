//! Descriptor sources that never touch the network.

use super::DescriptorFetcher;
use super::settings::RepoSettings;
use crate::error::FetchError;
use async_trait::async_trait;
use depset_schema::{RepoDescriptor, RepoId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Reads settings documents from a local mirror laid out as
/// `<root>/<owner>/<name>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &RepoId) -> PathBuf {
        self.root.join(id.owner()).join(format!("{}.json", id.name()))
    }
}

#[async_trait]
impl DescriptorFetcher for DirectoryFetcher {
    fn key(&self) -> String {
        format!("dir:{}", self.root.display())
    }

    async fn fetch(&self, id: &RepoId) -> Result<RepoDescriptor, FetchError> {
        let path = self.path_for(id);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(id.to_string()));
            }
            Err(e) => return Err(FetchError::transport(id.as_str(), e)),
        };
        Ok(RepoSettings::parse(id.as_str(), &text)?.into_descriptor(id.as_str()))
    }
}

/// An in-memory descriptor source.
///
/// Records every id it is asked for, which makes it the fetcher of choice
/// for exercising the engine.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    descriptors: HashMap<String, RepoDescriptor>,
    failures: HashMap<String, FetchError>,
    delay: Option<Duration>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `descriptor` for its id.
    pub fn with(mut self, descriptor: RepoDescriptor) -> Self {
        self.descriptors.insert(descriptor.id.clone(), descriptor);
        self
    }

    /// Answer `id` with `error` instead of a descriptor.
    pub fn failing(mut self, id: impl Into<String>, error: FetchError) -> Self {
        self.failures.insert(id.into(), error);
        self
    }

    /// Sleep before every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep before answering `id`, overriding [`Self::with_delay`].
    pub fn with_delay_for(mut self, id: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(id.into(), delay);
        self
    }

    /// Ids fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DescriptorFetcher for StaticFetcher {
    fn key(&self) -> String {
        "static".to_string()
    }

    async fn fetch(&self, id: &RepoId) -> Result<RepoDescriptor, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(id.to_string());
        }
        if let Some(delay) = self.delays.get(id.as_str()).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.failures.get(id.as_str()) {
            return Err(err.clone());
        }
        self.descriptors
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_fetcher_reads_mirror() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("contoso")).unwrap();
        std::fs::write(
            dir.path().join("contoso").join("app.json"),
            r#"{"appDependencyProbingPaths":[{"repo":"contoso/common"}]}"#,
        )
        .unwrap();

        let fetcher = DirectoryFetcher::new(dir.path());
        let descriptor = fetcher
            .fetch(&RepoId::parse("contoso/app").unwrap())
            .await
            .unwrap();
        assert_eq!(descriptor.repo_dependencies[0].id, "contoso/common");

        let err = fetcher
            .fetch(&RepoId::parse("contoso/absent").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::NotFound("contoso/absent".into()));
    }

    #[tokio::test]
    async fn test_static_fetcher_records_calls() {
        let fetcher = StaticFetcher::new()
            .with(RepoDescriptor::leaf("a/a"))
            .failing("b/b", FetchError::transport("b/b", "connection reset"));

        assert!(fetcher.fetch(&RepoId::parse("a/a").unwrap()).await.is_ok());
        assert!(matches!(
            fetcher.fetch(&RepoId::parse("b/b").unwrap()).await,
            Err(FetchError::Transport { .. })
        ));
        assert!(matches!(
            fetcher.fetch(&RepoId::parse("c/c").unwrap()).await,
            Err(FetchError::NotFound(_))
        ));
        assert_eq!(fetcher.calls(), vec!["a/a", "b/b", "c/c"]);
    }
}
