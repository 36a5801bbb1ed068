//! Prompt system for the adaptive RAG loop.
//!
//! This crate provides the parameterised templates the control loop fills:
//! - Built-in routing, grading and answer templates
//! - YAML overrides under `.arag/prompts/`
//! - Strict Handlebars rendering

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod set;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{list_prompts, load_prompt};
pub use set::PromptSet;
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptKind, PromptTemplate};
