//! Prompt types.
//!
//! Domain entities for the prompt system: the five template slots the
//! control loop fills, their YAML override format and the rendered result.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The five templates the control loop dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Routes a question to the retriever or web search
    Router,
    /// Grades one document's relevance to the question
    DocGrader,
    /// Grades whether a generation is grounded in the evidence
    HallucinationGrader,
    /// Grades whether a generation answers the question
    AnswerGrader,
    /// Produces the answer from the evidence
    Rag,
}

impl PromptKind {
    /// Every slot, in dispatch order.
    pub const ALL: [PromptKind; 5] = [
        PromptKind::Router,
        PromptKind::DocGrader,
        PromptKind::HallucinationGrader,
        PromptKind::AnswerGrader,
        PromptKind::Rag,
    ];

    /// Identifier used for override files (`.arag/prompts/<id>.yml`).
    pub fn id(&self) -> &'static str {
        match self {
            Self::Router => "router",
            Self::DocGrader => "doc_grader",
            Self::HallucinationGrader => "hallucination_grader",
            Self::AnswerGrader => "answer_grader",
            Self::Rag => "rag",
        }
    }

    /// Parse a slot from its identifier.
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Variables the loop supplies when rendering this slot.
    pub fn variables(&self) -> &'static [&'static str] {
        match self {
            Self::Router => &["question"],
            Self::DocGrader => &["document", "question"],
            Self::HallucinationGrader => &["documents", "generation"],
            Self::AnswerGrader => &["question", "generation"],
            Self::Rag => &["context", "question"],
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Slot identifier (one of the [`PromptKind`] ids)
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Optional system message template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// User message template with Handlebars syntax
    pub template: String,
}

/// A template ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Slot this template fills
    pub kind: PromptKind,

    /// System message template
    pub system: Option<String>,

    /// User message template
    pub template: String,

    /// Whether this template came from a workspace override
    #[serde(default)]
    pub overridden: bool,
}

impl PromptTemplate {
    /// Create a built-in template.
    pub fn new(kind: PromptKind, system: Option<&str>, template: &str) -> Self {
        Self {
            kind,
            system: system.map(str::to_string),
            template: template.to_string(),
            overridden: false,
        }
    }
}

/// A fully rendered prompt ready for the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source slot
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}

impl BuiltPrompt {
    /// Create a new built prompt.
    pub fn new(
        system: Option<String>,
        user: String,
        source_prompt_id: String,
        resolved_variables: HashMap<String, String>,
    ) -> Self {
        Self {
            system,
            user,
            metadata: BuiltPromptMetadata {
                source_prompt_id,
                resolved_variables,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: doc_grader
title: Strict relevance grader
apiVersion: "1.0"
createdBy: test
system: "You grade documents."
template: "{{document}} / {{question}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "doc_grader");
        assert_eq!(def.system.as_deref(), Some("You grade documents."));
        assert_eq!(def.template, "{{document}} / {{question}}");
    }

    #[test]
    fn test_prompt_kind_ids_round_trip() {
        for kind in PromptKind::ALL {
            assert_eq!(PromptKind::parse(kind.id()), Some(kind));
        }
        assert_eq!(PromptKind::parse("summarizer"), None);
    }

    #[test]
    fn test_rag_variables() {
        assert_eq!(PromptKind::Rag.variables(), &["context", "question"]);
        assert_eq!(
            PromptKind::HallucinationGrader.variables(),
            &["documents", "generation"]
        );
    }
}
