//! The template set injected into the control loop.

use crate::defaults;
use crate::loader::{list_prompts, load_prompt};
use crate::types::{PromptKind, PromptTemplate};
use arag_core::AppResult;
use std::path::Path;

/// The five templates the control loop fills at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub router: PromptTemplate,
    pub doc_grader: PromptTemplate,
    pub hallucination_grader: PromptTemplate,
    pub answer_grader: PromptTemplate,
    pub rag: PromptTemplate,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            router: PromptTemplate::new(
                PromptKind::Router,
                Some(defaults::ROUTER_SYSTEM),
                defaults::ROUTER_TEMPLATE,
            ),
            doc_grader: PromptTemplate::new(
                PromptKind::DocGrader,
                Some(defaults::DOC_GRADER_SYSTEM),
                defaults::DOC_GRADER_TEMPLATE,
            ),
            hallucination_grader: PromptTemplate::new(
                PromptKind::HallucinationGrader,
                Some(defaults::HALLUCINATION_GRADER_SYSTEM),
                defaults::HALLUCINATION_GRADER_TEMPLATE,
            ),
            answer_grader: PromptTemplate::new(
                PromptKind::AnswerGrader,
                Some(defaults::ANSWER_GRADER_SYSTEM),
                defaults::ANSWER_GRADER_TEMPLATE,
            ),
            rag: PromptTemplate::new(PromptKind::Rag, None, defaults::RAG_TEMPLATE),
        }
    }
}

impl PromptSet {
    /// Built-in templates overlaid with any `.arag/prompts/<id>.yml` overrides.
    pub fn load(workspace_path: &Path) -> AppResult<Self> {
        let mut set = Self::default();

        for id in list_prompts(workspace_path)? {
            let Some(kind) = PromptKind::parse(&id) else {
                tracing::warn!("Ignoring prompt file with unknown id: {}", id);
                continue;
            };

            let definition = load_prompt(workspace_path, &id)?;
            set.replace(PromptTemplate {
                kind,
                system: definition.system,
                template: definition.template,
                overridden: true,
            });
        }

        Ok(set)
    }

    /// Template for a slot.
    pub fn get(&self, kind: PromptKind) -> &PromptTemplate {
        match kind {
            PromptKind::Router => &self.router,
            PromptKind::DocGrader => &self.doc_grader,
            PromptKind::HallucinationGrader => &self.hallucination_grader,
            PromptKind::AnswerGrader => &self.answer_grader,
            PromptKind::Rag => &self.rag,
        }
    }

    /// Replace the template in the slot named by `template.kind`.
    pub fn replace(&mut self, template: PromptTemplate) {
        let slot = match template.kind {
            PromptKind::Router => &mut self.router,
            PromptKind::DocGrader => &mut self.doc_grader,
            PromptKind::HallucinationGrader => &mut self.hallucination_grader,
            PromptKind::AnswerGrader => &mut self.answer_grader,
            PromptKind::Rag => &mut self.rag,
        };
        *slot = template;
    }

    /// Templates in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &PromptTemplate> {
        PromptKind::ALL.into_iter().map(move |kind| self.get(kind))
    }
}
