//! Prompt loader for YAML template overrides.

use crate::types::{PromptDefinition, PromptKind};
use arag_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Directory holding template overrides for a workspace.
pub fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".arag/prompts")
}

/// Load a prompt definition by ID from the workspace.
///
/// Searches for `<id>.yml` in `.arag/prompts/`.
///
/// # Example
/// ```no_run
/// use arag_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "doc_grader")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt file {:?} declares id '{}'",
            prompt_file, definition.id
        )));
    }

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List all prompt override IDs in the workspace.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let prompts_dir = prompts_dir(workspace_path);

    if !prompts_dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(&prompts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if PromptKind::parse(&def.id).is_none() {
        return Err(AppError::Prompt(format!(
            "Unknown prompt id '{}'. Expected one of: router, doc_grader, hallucination_grader, answer_grader, rag",
            def.id
        )));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.api_version.is_empty() {
        return Err(AppError::Prompt(
            "Prompt apiVersion cannot be empty".to_string(),
        ));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_prompt(dir: &Path, id: &str, valid: bool) -> PathBuf {
        let prompts_dir = prompts_dir(dir);
        fs::create_dir_all(&prompts_dir).unwrap();

        let content = if valid {
            format!(
                r#"
id: {}
title: "Test Prompt"
apiVersion: "1.0"
createdBy: test
template: "Test template: {{{{question}}}}"
"#,
                id
            )
        } else {
            "invalid: yaml: content:".to_string()
        };

        let file_path = prompts_dir.join(format!("{}.yml", id));
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_load_valid_prompt() {
        let temp_dir = TempDir::new().unwrap();
        create_test_prompt(temp_dir.path(), "router", true);

        let prompt = load_prompt(temp_dir.path(), "router").unwrap();
        assert_eq!(prompt.id, "router");
        assert_eq!(prompt.template, "Test template: {{question}}");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "rag").is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        create_test_prompt(temp_dir.path(), "rag", false);

        assert!(load_prompt(temp_dir.path(), "rag").is_err());
    }

    #[test]
    fn test_load_unknown_slot() {
        let temp_dir = TempDir::new().unwrap();
        create_test_prompt(temp_dir.path(), "summarizer", true);

        let err = load_prompt(temp_dir.path(), "summarizer").unwrap_err();
        assert!(err.to_string().contains("Unknown prompt id"));
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        create_test_prompt(temp_dir.path(), "rag", true);
        create_test_prompt(temp_dir.path(), "answer_grader", true);

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts, vec!["answer_grader".to_string(), "rag".to_string()]);
    }
}
