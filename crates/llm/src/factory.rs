//! LLM provider factory.
//!
//! Creates LLM clients from the provider name and optional endpoint found
//! in the application configuration.

use crate::client::LlmClient;
use crate::providers::ollama::{OllamaClient, DEFAULT_OLLAMA_URL};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai", "claude")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
/// * `timeout_secs` - Optional HTTP timeout for every request
///
/// # Errors
/// Returns error if the provider is unknown, not implemented, or missing
/// required secrets.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout_secs: Option<u64>,
) -> Result<Arc<dyn LlmClient>, String> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or(DEFAULT_OLLAMA_URL);
            let client = match timeout_secs {
                Some(secs) => OllamaClient::with_timeout(base_url, Duration::from_secs(secs))?,
                None => OllamaClient::with_base_url(base_url),
            };
            Ok(Arc::new(client))
        }
        "openai" => {
            if api_key.is_none() {
                return Err("OpenAI provider requires API key".to_string());
            }
            Err("OpenAI provider not yet implemented".to_string())
        }
        "claude" | "anthropic" => {
            if api_key.is_none() {
                return Err("Claude provider requires API key".to_string());
            }
            Err("Claude provider not yet implemented".to_string())
        }
        _ => Err(format!("Unknown provider: {}", provider)),
    }
}
