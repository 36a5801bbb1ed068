//! Ollama LLM provider implementation.
//!
//! Integration with Ollama, a local LLM runtime.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage, ResponseFormat};
use arag_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "OllamaOptions::is_empty")]
    options: OllamaOptions,
    stream: bool,
}

/// Sampling options nested under `options`.
#[derive(Debug, Default, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl OllamaOptions {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_predict.is_none()
    }
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama LLM client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client against `http://localhost:11434`.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_OLLAMA_URL)
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client whose HTTP requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to create HTTP client for Ollama: {}", e))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Convert LlmRequest to Ollama format.
    fn to_ollama_request(&self, request: &LlmRequest) -> OllamaRequest {
        OllamaRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            system: request.system.clone(),
            format: request.format,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
            stream: false,
        }
    }

    /// Convert Ollama response to LlmResponse.
    fn convert_response(&self, response: OllamaResponse) -> LlmResponse {
        let usage = LlmUsage::new(
            response.prompt_eval_count.unwrap_or(0),
            response.eval_count.unwrap_or(0),
        );

        LlmResponse {
            content: response.response,
            model: response.model,
            usage,
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(
            model = %request.model,
            structured = request.is_structured(),
            "Sending completion request to Ollama"
        );

        let ollama_request = self.to_ollama_request(request);
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!(
            prompt_tokens = ollama_response.prompt_eval_count.unwrap_or(0),
            completion_tokens = ollama_response.eval_count.unwrap_or(0),
            "Received completion from Ollama"
        );

        Ok(self.convert_response(ollama_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url, "http://localhost:11434");

        let client = OllamaClient::with_base_url("http://gpu-box:11434/");
        assert_eq!(client.base_url, "http://gpu-box:11434");
    }

    #[test]
    fn test_ollama_request_conversion() {
        let client = OllamaClient::new();
        let request = LlmRequest::new("Hello", "llama3")
            .with_temperature(0.0)
            .with_max_tokens(100);

        let ollama_req = client.to_ollama_request(&request);
        assert_eq!(ollama_req.model, "llama3");
        assert_eq!(ollama_req.prompt, "Hello");
        assert_eq!(ollama_req.options.temperature, Some(0.0));
        assert_eq!(ollama_req.options.num_predict, Some(100));
        assert!(!ollama_req.stream);
    }

    #[test]
    fn test_json_mode_serializes_format() {
        let client = OllamaClient::new();
        let request = LlmRequest::new("route me", "llama3")
            .with_system("Return JSON with key datasource")
            .with_json_output();

        let body = serde_json::to_value(client.to_ollama_request(&request)).unwrap();
        assert_eq!(body["format"], "json");
        assert_eq!(body["system"], "Return JSON with key datasource");
        assert!(body.get("options").is_none());
    }

    #[test]
    fn test_response_conversion() {
        let client = OllamaClient::new();
        let raw: OllamaResponse = serde_json::from_str(
            r#"{"model":"llama3","response":"{\"binary_score\":\"yes\"}","done":true,"prompt_eval_count":40,"eval_count":8}"#,
        )
        .unwrap();

        let response = client.convert_response(raw);
        assert_eq!(response.content, r#"{"binary_score":"yes"}"#);
        assert_eq!(response.usage.total_tokens, 48);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_llm_error() {
        let client = OllamaClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client
            .complete(&LlmRequest::new("Hello", "llama3"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Llm(_)));
        assert!(err.is_collaborator_failure());
    }
}
