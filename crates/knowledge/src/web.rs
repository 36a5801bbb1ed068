//! Web search capability.

use arag_core::config::WebSearchConfig;
use arag_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSnippet {
    pub content: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

/// Returns snippets relevant to a query.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    async fn fetch(&self, query: &str) -> AppResult<Vec<WebSnippet>>;
}

/// Tavily search API client.
#[derive(Debug, Clone)]
pub struct TavilyClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_results: usize,
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<WebSnippet>,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>, max_results: usize) -> AppResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AppError::Config(
                "Tavily API key is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::WebSearch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: TAVILY_ENDPOINT.to_string(),
            api_key,
            max_results,
        })
    }

    /// Build a client from configuration and a resolved API key.
    pub fn from_config(config: &WebSearchConfig, api_key: Option<String>) -> AppResult<Self> {
        if config.provider != "tavily" {
            return Err(AppError::Config(format!(
                "Unknown web search provider: '{}'. Supported providers: tavily",
                config.provider
            )));
        }

        let api_key = api_key.ok_or_else(|| {
            AppError::Config(format!(
                "Web search requires an API key; set {}",
                config.api_key_env
            ))
        })?;

        let client = Self::new(api_key, config.max_results)?;
        Ok(match &config.endpoint {
            Some(endpoint) => client.with_endpoint(endpoint),
            None => client,
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl WebSearch for TavilyClient {
    async fn fetch(&self, query: &str) -> AppResult<Vec<WebSnippet>> {
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
        };

        tracing::debug!("Searching the web (max_results: {})", self.max_results);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::WebSearch(format!("Failed to reach {}: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::WebSearch(format!(
                "Search API returned {}: {}",
                status, body
            )));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::WebSearch(format!("Malformed search response: {}", e)))?;

        tracing::debug!("Web search returned {} snippets", body.results.len());
        Ok(body.results)
    }
}
