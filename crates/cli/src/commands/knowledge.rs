//! Knowledge command handler.
//!
//! Populates, inspects and clears the local knowledge bases the retriever
//! reads from.

use arag_core::{config::AppConfig, AppResult};
use arag_knowledge::{IndexRetriever, LearnOptions, Retriever};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Knowledge base management
#[derive(Args, Debug)]
pub struct KnowledgeCommand {
    #[command(subcommand)]
    pub action: KnowledgeAction,
}

#[derive(Subcommand, Debug)]
pub enum KnowledgeAction {
    /// Learn from local files and directories
    Learn(KnowledgeLearnCommand),
    /// Show the documents the retriever returns for a query
    Search(KnowledgeSearchCommand),
    /// Clean up knowledge base
    Clean(KnowledgeCleanCommand),
    /// Show knowledge base statistics
    Stats(KnowledgeStatsCommand),
}

/// Learn from sources
#[derive(Args, Debug)]
pub struct KnowledgeLearnCommand {
    /// Knowledge base name
    pub base: String,

    /// Paths to learn from
    #[arg(long, required = true)]
    pub path: Vec<PathBuf>,

    /// Only learn files whose path contains one of these substrings
    #[arg(long)]
    pub include: Vec<String>,

    /// Skip files whose path contains one of these substrings
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Reset base before learning
    #[arg(long)]
    pub reset: bool,

    /// Embedding provider (ollama, trigram)
    #[arg(long)]
    pub embedding_provider: Option<String>,

    /// Embedding model
    #[arg(long)]
    pub embedding_model: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeLearnCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge learn command for base '{}'", self.base);

        let options = LearnOptions {
            base_name: self.base.clone(),
            paths: self.path.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            reset: self.reset,
            embedding_provider: self.embedding_provider.clone(),
            embedding_model: self.embedding_model.clone(),
        };

        let stats =
            arag_knowledge::learn(&config.workspace, options, config.provider_endpoint()).await?;

        if self.json {
            let output = serde_json::json!({
                "base": self.base,
                "sourcesCount": stats.sources_count,
                "chunksCount": stats.chunks_count,
                "bytesProcessed": stats.bytes_processed,
                "skipped": stats.skipped,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Learned {} sources ({} chunks, {} bytes) in {:.2}s",
                stats.sources_count, stats.chunks_count, stats.bytes_processed, stats.duration_secs
            );
            for path in &stats.skipped {
                eprintln!("skipped: {}", path.display());
            }
        }

        Ok(())
    }
}

/// Query the retriever directly
#[derive(Args, Debug)]
pub struct KnowledgeSearchCommand {
    /// Knowledge base name
    pub base: String,

    /// Query text
    pub query: String,

    /// Number of documents to return (overrides retriever.k)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeSearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge search command for base '{}'", self.base);

        let mut retriever_config = config.retriever.clone();
        retriever_config.knowledge_base = self.base.clone();
        if let Some(k) = self.top_k {
            retriever_config.k = k;
        }

        let retriever = IndexRetriever::open(
            &config.workspace,
            &retriever_config,
            config.provider_endpoint(),
        )?;
        let documents = retriever.fetch(&self.query).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&documents)?);
            return Ok(());
        }

        if documents.is_empty() {
            println!("No documents found in '{}'", self.base);
        }
        for (i, document) in documents.iter().enumerate() {
            println!(
                "[{}] {}",
                i + 1,
                document.metadata_str("source").unwrap_or("(unknown source)")
            );
            println!("{}", document.content.trim());
            println!();
        }

        Ok(())
    }
}

/// Clean knowledge base
#[derive(Args, Debug)]
pub struct KnowledgeCleanCommand {
    /// Knowledge base name
    pub base: String,
}

impl KnowledgeCleanCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge clean command for base '{}'", self.base);

        arag_knowledge::clean(&config.workspace, &self.base)?;

        println!("Knowledge base '{}' cleaned", self.base);

        Ok(())
    }
}

/// Show knowledge base stats
#[derive(Args, Debug)]
pub struct KnowledgeStatsCommand {
    /// Knowledge base name
    pub base: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeStatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge stats command for base '{}'", self.base);

        let stats = arag_knowledge::stats(&config.workspace, &self.base)?;

        if self.json {
            let output = serde_json::json!({
                "base": stats.base_name,
                "sourcesCount": stats.sources_count,
                "chunksCount": stats.chunks_count,
                "dbSizeBytes": stats.db_size_bytes,
                "lastLearnAt": stats.last_learn_at,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Knowledge base: {}", stats.base_name);
            println!("  Sources: {}", stats.sources_count);
            println!("  Chunks: {}", stats.chunks_count);
            println!("  DB size: {} bytes", stats.db_size_bytes);
            if let Some(last_learn) = stats.last_learn_at {
                println!("  Last learn: {}", last_learn);
            }
        }

        Ok(())
    }
}

impl KnowledgeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            KnowledgeAction::Learn(cmd) => cmd.execute(config).await,
            KnowledgeAction::Search(cmd) => cmd.execute(config).await,
            KnowledgeAction::Clean(cmd) => cmd.execute(config),
            KnowledgeAction::Stats(cmd) => cmd.execute(config),
        }
    }
}
