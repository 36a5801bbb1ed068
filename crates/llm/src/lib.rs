//! Text generator crate.
//!
//! A provider-agnostic abstraction over chat-style completion models with an
//! optional JSON-constrained mode for structured verdicts.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//!
//! # Example
//! ```no_run
//! use arag_llm::{LlmClient, LlmRequest, OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2").with_json_output();
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage, ResponseFormat};
pub use factory::create_client;
pub use providers::OllamaClient;
