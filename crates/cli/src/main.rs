//! arag CLI
//!
//! Answers questions with an adaptive retrieval loop over a local knowledge
//! base and web search, and manages the knowledge bases it reads from.

mod commands;

use arag_core::{config::AppConfig, logging, AppResult};
use clap::{Parser, Subcommand};
use commands::{AskCommand, KnowledgeCommand, PromptsCommand};
use std::path::PathBuf;

/// Adaptive retrieval-augmented question answering
#[derive(Parser, Debug)]
#[command(name = "arag")]
#[command(about = "Adaptive retrieval-augmented question answering", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "ARAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "ARAG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (ollama)
    #[arg(short, long, global = true, env = "ARAG_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "ARAG_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question with the adaptive retrieval loop
    Ask(AskCommand),

    /// Knowledge base management
    Knowledge(KnowledgeCommand),

    /// List the active prompt templates
    Prompts(PromptsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ask(_) => "ask",
            Commands::Knowledge(_) => "knowledge",
            Commands::Prompts(_) => "prompts",
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.workspace, cli.config)?.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("arag starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;
    config.ensure_arag_dir()?;

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Knowledge(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
