//! OpenAI Assistant Directory - Lists assistants via the Assistants API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key).with_base_url("https://api.openai.com/v1");
//! let directory = OpenAIAssistantDirectory::new(config);
//! ```
//!
//! The listing endpoint is paginated with `after` cursors; pages are fetched
//! until `has_more` is false.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::foundation::AssistantId;
use crate::ports::{AssistantDirectory, AssistantSummary, DirectoryError};

/// Page size requested from the API (its maximum).
const PAGE_LIMIT: &str = "100";

/// Hard stop on pagination.
const MAX_PAGES: usize = 20;

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

pub struct OpenAIAssistantDirectory {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIAssistantDirectory {
    pub fn new(config: OpenAIConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    fn assistants_url(&self) -> String {
        format!("{}/assistants", self.config.base_url.trim_end_matches('/'))
    }

    async fn fetch_page(&self, after: Option<&str>) -> Result<AssistantPage, DirectoryError> {
        let mut query = vec![("limit", PAGE_LIMIT), ("order", "asc")];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }

        let response = self
            .client
            .get(self.assistants_url())
            .bearer_auth(self.config.api_key())
            .header("OpenAI-Beta", "assistants=v2")
            .query(&query)
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        let response = Self::handle_response_status(response).await?;
        response
            .json::<AssistantPage>()
            .await
            .map_err(|e| DirectoryError::Parse(e.to_string()))
    }

    /// Fetches one page, retrying transient failures with exponential backoff.
    async fn fetch_page_with_retry(&self, after: Option<&str>) -> Result<AssistantPage, DirectoryError> {
        let mut retry_count = 0;
        loop {
            match self.fetch_page(after).await {
                Ok(page) => return Ok(page),
                Err(err) if is_retryable(&err) && retry_count < self.config.max_retries => {
                    tracing::warn!(error = %err, retry_count, "assistant listing failed, retrying");
                    sleep(Duration::from_millis(500 << retry_count)).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn handle_response_status(response: Response) -> Result<Response, DirectoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(DirectoryError::AuthenticationFailed),
            429 => Err(DirectoryError::RateLimited),
            500..=599 => Err(DirectoryError::Unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(DirectoryError::Network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }
}

fn is_retryable(err: &DirectoryError) -> bool {
    matches!(
        err,
        DirectoryError::RateLimited | DirectoryError::Unavailable(_) | DirectoryError::Network(_)
    )
}

#[async_trait]
impl AssistantDirectory for OpenAIAssistantDirectory {
    async fn list_assistants(&self) -> Result<Vec<AssistantSummary>, DirectoryError> {
        let mut assistants = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page = self.fetch_page_with_retry(cursor.as_deref()).await?;
            let has_more = page.has_more;
            let last_id = page.last_id.clone();

            assistants.extend(page.into_summaries());

            match (has_more, last_id) {
                (true, Some(last)) => cursor = Some(last),
                _ => break,
            }
        }

        tracing::debug!(count = assistants.len(), "assistants listed");
        Ok(assistants)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct AssistantPage {
    data: Vec<OpenAIAssistant>,
    #[serde(default)]
    last_id: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct OpenAIAssistant {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

impl AssistantPage {
    fn into_summaries(self) -> Vec<AssistantSummary> {
        self.data
            .into_iter()
            .filter_map(|a| {
                let name = a
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| a.id.clone());
                AssistantId::new(a.id).ok().map(|id| AssistantSummary {
                    id,
                    name,
                    model: a.model,
                })
            })
            .collect()
    }
}
