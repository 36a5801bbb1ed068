//! Command handlers for the arag CLI.

pub mod ask;
pub mod knowledge;
pub mod prompts;

pub use ask::AskCommand;
pub use knowledge::KnowledgeCommand;
pub use prompts::PromptsCommand;
