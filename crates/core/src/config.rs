//! Configuration management for the adaptive RAG CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config files (.arag/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric, with all state stored in `.arag/`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the LLM factory knows about.
pub const KNOWN_PROVIDERS: [&str; 3] = ["ollama", "openai", "claude"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .arag/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider (e.g., "ollama")
    pub provider: String,

    /// Generator model identifier
    pub model: String,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Document retriever settings
    pub retriever: RetrieverConfig,

    /// Web search settings
    pub web_search: WebSearchConfig,

    /// Control loop settings
    pub workflow: WorkflowConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Claude {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        #[serde(rename = "apiVersion")]
        api_version: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        /// HTTP timeout in seconds
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Claude { model, .. } | Self::Ollama { model, .. } => {
                model
            }
        }
    }

    /// Custom endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
            Self::OpenAI { endpoint, .. } | Self::Claude { endpoint, .. } => endpoint.as_deref(),
        }
    }

    /// HTTP timeout configured for this provider.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            Self::Ollama { timeout, .. } => *timeout,
            _ => None,
        }
    }
}

/// Retriever settings (maximal-marginal-relevance search over a local base).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrieverConfig {
    /// Knowledge base queried by the retriever
    #[serde(default = "default_knowledge_base")]
    pub knowledge_base: String,

    /// Documents returned per query
    #[serde(default = "default_k")]
    pub k: usize,

    /// Candidates considered before MMR re-ranking
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// MMR trade-off: 1.0 is pure relevance, 0.0 is pure diversity
    #[serde(default = "default_lambda_mult")]
    pub lambda_mult: f32,
}

fn default_knowledge_base() -> String {
    "default".to_string()
}

fn default_k() -> usize {
    3
}

fn default_fetch_k() -> usize {
    20
}

fn default_lambda_mult() -> f32 {
    0.5
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            knowledge_base: default_knowledge_base(),
            k: default_k(),
            fetch_k: default_fetch_k(),
            lambda_mult: default_lambda_mult(),
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebSearchConfig {
    /// Search provider ("tavily")
    #[serde(default = "default_search_provider")]
    pub provider: String,

    /// Environment variable holding the provider API key
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Snippets returned per query
    #[serde(default = "default_k")]
    pub max_results: usize,

    /// Custom endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_search_provider() -> String {
    "tavily".to_string()
}

fn default_search_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            api_key_env: default_search_key_env(),
            max_results: default_k(),
            endpoint: None,
        }
    }
}

/// Control loop settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Additional generation attempts after the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-call timeout for generator, retriever and web search calls
    #[serde(default)]
    pub call_timeout_secs: Option<u64>,

    /// Sampling temperature for every generator call
    #[serde(default)]
    pub temperature: f32,
}

fn default_max_retries() -> u32 {
    3
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            call_timeout_secs: None,
            temperature: 0.0,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    retriever: Option<RetrieverConfig>,
    web_search: Option<WebSearchConfig>,
    workflow: Option<WorkflowConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2:3b-instruct-fp16".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            retriever: RetrieverConfig::default(),
            web_search: WebSearchConfig::default(),
            workflow: WorkflowConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `ARAG_WORKSPACE`: Override workspace path
    /// - `ARAG_CONFIG`: Path to config file
    /// - `ARAG_PROVIDER`: LLM provider
    /// - `ARAG_MODEL`: Model identifier
    /// - `ARAG_API_KEY`: API key
    /// - `ARAG_MAX_RETRIES`: Retry budget for the control loop
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration, letting explicit paths win over the environment.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| std::env::var("ARAG_WORKSPACE").ok().map(PathBuf::from)) {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("ARAG_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.arag_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("ARAG_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("ARAG_MODEL") {
            config.model = model;
        }

        if let Ok(retries) = std::env::var("ARAG_MAX_RETRIES") {
            config.workflow.max_retries = retries.trim().parse().map_err(|_| {
                AppError::Config(format!("ARAG_MAX_RETRIES must be a non-negative integer, got '{}'", retries))
            })?;
        }

        config.api_key = std::env::var("ARAG_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        if let Some(retriever) = config_file.retriever {
            result.retriever = retriever;
        }

        if let Some(web_search) = config_file.web_search {
            result.web_search = web_search;
        }

        if let Some(workflow) = config_file.workflow {
            result.workflow = workflow;
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .arag directory.
    pub fn arag_dir(&self) -> PathBuf {
        self.workspace.join(".arag")
    }

    /// Ensure the .arag directory exists.
    pub fn ensure_arag_dir(&self) -> AppResult<()> {
        let arag_dir = self.arag_dir();
        if !arag_dir.exists() {
            std::fs::create_dir_all(&arag_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .arag directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Get the configuration block for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint configured for the active provider.
    pub fn provider_endpoint(&self) -> Option<&str> {
        self.get_provider_config(&self.provider)
            .and_then(ProviderConfig::endpoint)
    }

    /// Resolve the LLM API key from the environment.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider)? {
            ProviderConfig::OpenAI { api_key_env, .. } | ProviderConfig::Claude { api_key_env, .. } => {
                std::env::var(api_key_env).ok()
            }
            ProviderConfig::Ollama { .. } => None,
        }
    }

    /// Resolve the web search API key from the configured environment variable.
    pub fn resolve_web_search_key(&self) -> Option<String> {
        std::env::var(&self.web_search.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = &self.provider;

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. } | ProviderConfig::Claude { api_key_env, .. }) =
            self.get_provider_config(provider)
        {
            if self.api_key.is_none() && std::env::var(api_key_env).is_err() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    api_key_env
                )));
            }
        }

        if self.retriever.k == 0 {
            return Err(AppError::Config("retriever.k must be at least 1".to_string()));
        }

        if self.retriever.fetch_k < self.retriever.k {
            return Err(AppError::Config(format!(
                "retriever.fetchK ({}) must be >= retriever.k ({})",
                self.retriever.fetch_k, self.retriever.k
            )));
        }

        if !(0.0..=1.0).contains(&self.retriever.lambda_mult) {
            return Err(AppError::Config(format!(
                "retriever.lambdaMult must be within [0, 1], got {}",
                self.retriever.lambda_mult
            )));
        }

        Ok(())
    }
}
