//! GitHub contents API adapter.

use super::DescriptorFetcher;
use super::settings::{DEFAULT_SETTINGS_PATH, RepoSettings};
use crate::error::FetchError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use depset_schema::{RepoDescriptor, RepoId};
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use tracing::debug;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    #[serde(default)]
    encoding: String,
}

/// Reads repository settings documents through the GitHub contents API.
///
/// Requests are unauthenticated; private repositories surface as
/// [`FetchError::NotFound`].
#[derive(Debug, Clone)]
pub struct GitHubFetcher {
    client: Client,
    api_url: String,
    settings_path: String,
}

impl GitHubFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            settings_path: DEFAULT_SETTINGS_PATH.to_string(),
        }
    }

    /// Point the fetcher at another API root (GitHub Enterprise, test server).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Read the settings document from another path inside each repository.
    pub fn with_settings_path(mut self, path: impl Into<String>) -> Self {
        self.settings_path = path.into();
        self
    }

    fn contents_url(&self, id: &RepoId) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url.trim_end_matches('/'),
            id.owner(),
            id.name(),
            self.settings_path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl DescriptorFetcher for GitHubFetcher {
    fn key(&self) -> String {
        format!("github:{}", self.api_url)
    }

    async fn fetch(&self, id: &RepoId) -> Result<RepoDescriptor, FetchError> {
        let url = self.contents_url(id);
        debug!(repo = %id, %url, "requesting settings document");

        let resp = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::USER_AGENT, crate::USER_AGENT)
            .send()
            .await
            .map_err(|e| FetchError::transport(id.as_str(), e))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(id.to_string()));
        }
        if !resp.status().is_success() {
            return Err(FetchError::transport(
                id.as_str(),
                format!("HTTP {}", resp.status()),
            ));
        }

        let body: ContentsResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::malformed(id.as_str(), e))?;

        let text = if body.encoding.eq_ignore_ascii_case("base64") {
            let packed: String = body
                .content
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            let bytes = STANDARD
                .decode(packed)
                .map_err(|e| FetchError::malformed(id.as_str(), e))?;
            String::from_utf8(bytes).map_err(|e| FetchError::malformed(id.as_str(), e))?
        } else {
            body.content
        };

        Ok(RepoSettings::parse(id.as_str(), &text)?.into_descriptor(id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn contents_body(settings: &str) -> String {
        // GitHub wraps the payload at 60 columns.
        let encoded = STANDARD.encode(settings);
        let wrapped: Vec<String> = encoded
            .as_bytes()
            .chunks(60)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect();
        serde_json::json!({
            "type": "file",
            "encoding": "base64",
            "content": wrapped.join("\n"),
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_fetch_settings_descriptor() {
        let mut server = Server::new_async().await;
        let settings = r#"{"appDependencyProbingPaths":[{"repo":"contoso/common","version":"latest","release_status":"release"}],"appDependencies":["https://cdn.example.com/BaseApp_18.0.0.0.app"]}"#;

        let _m = server
            .mock("GET", "/repos/contoso/app/contents/.AL-Go/settings.json")
            .match_header("accept", "application/vnd.github+json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(contents_body(settings))
            .create_async()
            .await;

        let fetcher = GitHubFetcher::new(Client::new()).with_api_url(server.url());
        let id = RepoId::parse("contoso/app").unwrap();
        let descriptor = fetcher.fetch(&id).await.unwrap();

        assert_eq!(descriptor.id, "contoso/app");
        assert_eq!(descriptor.repo_dependencies.len(), 1);
        assert_eq!(descriptor.repo_dependencies[0].id, "contoso/common");
        assert_eq!(descriptor.file_dependencies[0].name, "BaseApp_18.0.0.0.app");
    }

    #[tokio::test]
    async fn test_missing_settings_is_not_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/contoso/empty/contents/.AL-Go/settings.json")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = GitHubFetcher::new(Client::new()).with_api_url(server.url());
        let id = RepoId::parse("contoso/empty").unwrap();
        let err = fetcher.fetch(&id).await.unwrap_err();
        assert_eq!(err, FetchError::NotFound("contoso/empty".into()));
    }

    #[tokio::test]
    async fn test_server_error_is_transport() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/contoso/flaky/contents/custom/deps.json")
            .with_status(502)
            .create_async()
            .await;

        let fetcher = GitHubFetcher::new(Client::new())
            .with_api_url(server.url())
            .with_settings_path("/custom/deps.json");
        let id = RepoId::parse("contoso/flaky").unwrap();
        let err = fetcher.fetch(&id).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_garbage_payload_is_malformed() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/contoso/bad/contents/.AL-Go/settings.json")
            .with_status(200)
            .with_body(contents_body("not json"))
            .create_async()
            .await;

        let fetcher = GitHubFetcher::new(Client::new()).with_api_url(server.url());
        let id = RepoId::parse("contoso/bad").unwrap();
        let err = fetcher.fetch(&id).await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }
}
