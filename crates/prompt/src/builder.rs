//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptTemplate};
use arag_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a template and input variables.
///
/// Both the system and user parts are rendered with the same variables.
/// Rendering is strict: a template that references a variable the caller did
/// not supply is an error.
///
/// # Example
/// ```no_run
/// use arag_prompt::{build_prompt, PromptKind, PromptSet};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompts = PromptSet::default();
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is an agent?".to_string());
///
/// let built = build_prompt(prompts.get(PromptKind::Router), vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    template: &PromptTemplate,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::trace!("Building prompt: {}", template.kind);

    let system = template
        .system
        .as_deref()
        .map(|system| render_template(system, &variables))
        .transpose()?;

    let user = render_template(&template.template, &variables)?;

    Ok(BuiltPrompt::new(
        system,
        user,
        template.kind.id().to_string(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
pub(crate) fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text prompts, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PromptKind;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple_template() {
        let result = render_template("Question: {{question}}", &vars(&[("question", "Hello")]));
        assert_eq!(result.unwrap(), "Question: Hello");
    }

    #[test]
    fn test_render_does_not_escape() {
        let result = render_template(
            "{{document}}",
            &vars(&[("document", "<b>a & b</b> \"quoted\"")]),
        );
        assert_eq!(result.unwrap(), "<b>a & b</b> \"quoted\"");
    }

    #[test]
    fn test_render_template_missing_variable() {
        let result = render_template("Question: {{missing}}", &HashMap::new());
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_build_prompt_renders_system_and_user() {
        let template = PromptTemplate::new(
            PromptKind::DocGrader,
            Some("Grade for: {{question}}"),
            "Doc: {{document}}",
        );

        let built = build_prompt(
            &template,
            vars(&[("question", "What is MMR?"), ("document", "MMR balances relevance")]),
        )
        .unwrap();

        assert_eq!(built.system.as_deref(), Some("Grade for: What is MMR?"));
        assert_eq!(built.user, "Doc: MMR balances relevance");
        assert_eq!(built.metadata.source_prompt_id, "doc_grader");
        assert_eq!(built.metadata.resolved_variables.len(), 2);
    }

    #[test]
    fn test_build_prompt_without_system() {
        let template = PromptTemplate::new(PromptKind::Rag, None, "{{context}}\n{{question}}");
        let built = build_prompt(&template, vars(&[("context", "ctx"), ("question", "q")])).unwrap();

        assert!(built.system.is_none());
        assert_eq!(built.user, "ctx\nq");
    }
}
