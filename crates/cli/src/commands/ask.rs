//! Ask command handler.
//!
//! Wires the configured generator, retriever and web search into the
//! adaptive loop and prints the outcome.

use arag_core::{config::AppConfig, AppError, AppResult};
use arag_knowledge::{IndexRetriever, TavilyClient};
use arag_llm::create_client;
use arag_prompt::PromptSet;
use arag_workflow::{AdaptiveRag, LoopConfig, RunOptions, RunOutcome, RunStatus};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

/// Answer a question with the adaptive retrieval loop
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Additional generation attempts after the first
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Knowledge base to retrieve from (overrides retriever.knowledgeBase)
    #[arg(short, long)]
    pub base: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question()?;
        let rag = AdaptiveRag::new(self.loop_config(config)?);

        let outcome = rag
            .run(
                &question,
                RunOptions {
                    max_retries: self.max_retries,
                },
            )
            .await?;

        tracing::debug!(
            "Run finished: status={:?}, route={}, attempts={}, evidence={}",
            outcome.status,
            outcome.route,
            outcome.attempts,
            outcome.evidence_count
        );

        self.print(&outcome)
    }

    fn question(&self) -> AppResult<String> {
        let question = self.question.trim().to_string();
        if question.is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }
        Ok(question)
    }

    fn loop_config(&self, config: &AppConfig) -> AppResult<LoopConfig> {
        let timeout_secs = config.workflow.call_timeout_secs;
        let http_timeout = config
            .get_provider_config(&config.provider)
            .and_then(|provider| provider.timeout())
            .or(timeout_secs);
        let api_key = config.resolve_api_key(&config.provider);

        let generator = create_client(
            &config.provider,
            config.provider_endpoint(),
            api_key.as_deref(),
            http_timeout,
        )
        .map_err(AppError::Config)?;

        let mut retriever_config = config.retriever.clone();
        if let Some(base) = &self.base {
            retriever_config.knowledge_base = base.clone();
        }
        let retriever = IndexRetriever::open(
            &config.workspace,
            &retriever_config,
            config.provider_endpoint(),
        )?;

        let web_search =
            TavilyClient::from_config(&config.web_search, config.resolve_web_search_key())?;

        Ok(LoopConfig {
            generator,
            model: config.model.clone(),
            temperature: config.workflow.temperature,
            retriever: Arc::new(retriever),
            web_search: Arc::new(web_search),
            prompts: PromptSet::load(&config.workspace)?,
            max_retries: config.workflow.max_retries,
            call_timeout: timeout_secs.map(Duration::from_secs),
        })
    }

    fn print(&self, outcome: &RunOutcome) -> AppResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(outcome)?);
            return Ok(());
        }

        if outcome.status == RunStatus::Exhausted {
            eprintln!(
                "warning: answer did not pass grading after {} attempts; showing the last draft",
                outcome.attempts
            );
        }
        println!("{}", outcome.answer);
        Ok(())
    }
}
