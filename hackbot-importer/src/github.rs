//! GitHub issue tracker client.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

/// The subset of a GitHub issue the importer reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub html_url: String,
    pub state: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.state == "open"
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label.name == name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("missing API token")]
    MissingToken,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
}

/// Source of issues to import.
#[async_trait::async_trait]
pub trait IssueTracker: Send + Sync {
    async fn fetch_issues(&self) -> Result<Vec<Issue>, TrackerError>;
}

/// Issue tracker backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubTracker {
    client: reqwest::Client,
    url: String,
    token: String,
    per_page: u8,
}

impl GithubTracker {
    pub fn new(api_base: &str, repo: &str, token: &str, per_page: u8) -> Result<Self, TrackerError> {
        if token.trim().is_empty() {
            return Err(TrackerError::MissingToken);
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("hackbot"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TrackerError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            url: issues_url(api_base, repo),
            token: token.trim().to_string(),
            per_page,
        })
    }
}

fn issues_url(api_base: &str, repo: &str) -> String {
    format!(
        "{}/repos/{}/issues",
        api_base.trim_end_matches('/'),
        repo.trim_matches('/')
    )
}

#[async_trait::async_trait]
impl IssueTracker for GithubTracker {
    async fn fetch_issues(&self) -> Result<Vec<Issue>, TrackerError> {
        let response = self
            .client
            .get(&self.url)
            .basic_auth(&self.token, None::<&str>)
            .query(&[("per_page", self.per_page.to_string())])
            .send()
            .await
            .map_err(|e| TrackerError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Api { status, body });
        }

        response
            .json::<Vec<Issue>>()
            .await
            .map_err(|e| TrackerError::RequestFailed(e.to_string()))
    }
}
