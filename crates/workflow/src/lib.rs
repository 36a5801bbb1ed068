//! Adaptive retrieval-augmented generation.
//!
//! [`AdaptiveRag`] answers a question by routing it to a local retriever or
//! to web search, filtering evidence with a relevance grader, generating an
//! answer, and grading that answer for groundedness and usefulness. Answers
//! that fail grading are regenerated (or backed with more web evidence)
//! until they pass or the retry budget is spent.
//!
//! # Example
//! ```no_run
//! use arag_workflow::{AdaptiveRag, LoopConfig, RunOptions};
//!
//! # async fn example(config: LoopConfig) -> arag_core::AppResult<()> {
//! let rag = AdaptiveRag::new(config);
//! let outcome = rag
//!     .run("What are the types of agent memory?", RunOptions::default())
//!     .await?;
//! println!("{} ({:?})", outcome.answer, outcome.status);
//! # Ok(())
//! # }
//! ```

pub mod decode;
pub mod engine;
pub mod grading;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::{AdaptiveRag, LoopConfig, LoopState, RunOptions, RunOutcome};
pub use state::{Event, State};
pub use types::{
    AnswerGrade, Groundedness, Relevance, RoutingDecision, RunStatus, Usefulness,
};
