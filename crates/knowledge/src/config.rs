//! Knowledge base configuration and on-disk layout.
//!
//! Each base lives under `.arag/knowledge/<base>/` with a `config.yaml`
//! describing its chunking and embedding setup, and an `index.db` holding
//! sources, chunks and embeddings.

use crate::types::KnowledgeBaseConfig;
use arag_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Load knowledge base configuration.
///
/// Reads `.arag/knowledge/<base>/config.yaml` if present, otherwise returns
/// the defaults for `base_name`.
pub fn load_config(workspace: &Path, base_name: &str) -> AppResult<KnowledgeBaseConfig> {
    let config_path = get_config_path(workspace, base_name);

    if !config_path.exists() {
        tracing::debug!(
            "Using default knowledge base config for '{}' (no config file found)",
            base_name
        );
        return Ok(KnowledgeBaseConfig {
            name: base_name.to_string(),
            ..Default::default()
        });
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        AppError::Knowledge(format!("Failed to read config at {:?}: {}", config_path, e))
    })?;

    let mut config: KnowledgeBaseConfig = serde_yaml::from_str(&content).map_err(|e| {
        AppError::Knowledge(format!("Failed to parse config at {:?}: {}", config_path, e))
    })?;

    config.name = base_name.to_string();

    if config.chunk_overlap >= config.chunk_size {
        return Err(AppError::Knowledge(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            config.chunk_overlap, config.chunk_size
        )));
    }

    tracing::debug!("Loaded knowledge base config for '{}'", base_name);
    Ok(config)
}

/// Save knowledge base configuration.
pub fn save_config(workspace: &Path, config: &KnowledgeBaseConfig) -> AppResult<()> {
    let config_path = get_config_path(workspace, &config.name);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Knowledge(format!("Failed to create config directory: {}", e))
        })?;
    }

    let yaml = serde_yaml::to_string(config)
        .map_err(|e| AppError::Knowledge(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Knowledge(format!("Failed to write config to {:?}: {}", config_path, e))
    })?;

    tracing::debug!("Saved knowledge base config for '{}'", config.name);
    Ok(())
}

/// Directory holding a base's files.
pub fn get_base_dir(workspace: &Path, base_name: &str) -> PathBuf {
    workspace.join(".arag").join("knowledge").join(base_name)
}

pub fn get_config_path(workspace: &Path, base_name: &str) -> PathBuf {
    get_base_dir(workspace, base_name).join("config.yaml")
}

pub fn get_index_path(workspace: &Path, base_name: &str) -> PathBuf {
    get_base_dir(workspace, base_name).join("index.db")
}
