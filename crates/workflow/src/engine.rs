//! The adaptive RAG control loop.

use crate::decode::{decode_binary_score, decode_route};
use crate::grading;
use crate::state::{Event, State};
use crate::types::{
    AnswerGrade, Groundedness, Relevance, RoutingDecision, RunStatus, Usefulness,
};
use arag_core::{AppError, AppResult};
use arag_knowledge::{Document, Retriever, WebSearch};
use arag_llm::{LlmClient, LlmRequest};
use arag_prompt::{build_prompt, PromptSet, PromptTemplate};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Everything the loop needs, injected once at assembly time.
#[derive(Clone)]
pub struct LoopConfig {
    /// Text generator used for routing, grading and answering
    pub generator: Arc<dyn LlmClient>,

    /// Model name passed on every generator call
    pub model: String,

    /// Sampling temperature for every generator call
    pub temperature: f32,

    pub retriever: Arc<dyn Retriever>,

    pub web_search: Arc<dyn WebSearch>,

    pub prompts: PromptSet,

    /// Default retry budget when a run does not override it
    pub max_retries: u32,

    /// Limit for each generator, retriever and web search call
    pub call_timeout: Option<Duration>,
}

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides [`LoopConfig::max_retries`]
    pub max_retries: Option<u32>,
}

/// Mutable state for one question. Created per run, dropped at the end.
#[derive(Debug, Clone)]
pub struct LoopState {
    pub question: String,
    pub generation: String,
    pub needs_web_search: bool,
    pub max_retries: u32,
    /// Generation attempts so far; only ever increases
    pub retry_count: u32,
    pub evidence: Vec<Document>,
    /// Documents that ever entered the evidence set
    pub documents_considered: usize,
    pub used_web_search: bool,
}

impl LoopState {
    pub fn new(question: impl Into<String>, max_retries: u32) -> Self {
        Self {
            question: question.into(),
            generation: String::new(),
            needs_web_search: false,
            max_retries,
            retry_count: 0,
            evidence: Vec::new(),
            documents_considered: 0,
            used_web_search: false,
        }
    }

    /// Evidence text as the generator and hallucination grader see it.
    pub fn context(&self) -> String {
        self.evidence
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Result of one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub answer: String,
    pub status: RunStatus,
    pub route: RoutingDecision,
    /// Documents in the final evidence set
    pub evidence_count: usize,
    /// Documents that entered the evidence set at any point
    pub documents_considered: usize,
    pub used_web_search: bool,
    /// Generation attempts made
    pub attempts: u32,
}

impl RunOutcome {
    pub fn is_accepted(&self) -> bool {
        self.status == RunStatus::Accepted
    }
}

/// Answers questions by routing, grading and regenerating until the answer
/// is grounded and useful or the retry budget runs out.
///
/// Runs are independent: each owns its [`LoopState`], and the collaborators
/// are shared read-only, so one `AdaptiveRag` can serve concurrent callers.
pub struct AdaptiveRag {
    config: LoopConfig,
}

impl AdaptiveRag {
    pub fn new(config: LoopConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Drive the state machine from `Routing` to a terminal state.
    pub async fn run(&self, question: &str, options: RunOptions) -> AppResult<RunOutcome> {
        let max_retries = options.max_retries.unwrap_or(self.config.max_retries);
        let mut loop_state = LoopState::new(question, max_retries);
        let mut route = None;
        let mut state = State::Routing;

        info!("Answering question (max retries: {})", max_retries);

        while !state.is_terminal() {
            let event = match state {
                State::Routing => {
                    let decision = self.route(&loop_state.question).await?;
                    route = Some(decision);
                    Event::Routed(decision)
                }
                State::Retrieving => {
                    self.retrieve(&mut loop_state).await?;
                    Event::Retrieved
                }
                State::SearchingWeb => {
                    self.search_web(&mut loop_state).await?;
                    Event::Searched
                }
                State::GradingDocuments => {
                    let evidence = std::mem::take(&mut loop_state.evidence);
                    let (kept, needs_web_search) =
                        self.grade_documents(&loop_state.question, evidence).await?;
                    loop_state.evidence = kept;
                    loop_state.needs_web_search = needs_web_search;
                    Event::DocumentsGraded { needs_web_search }
                }
                State::Generating => {
                    self.generate(&mut loop_state).await?;
                    Event::Generated
                }
                State::GradingAnswer => Event::AnswerGraded(self.grade_answer(&loop_state).await?),
                State::Accepted | State::Exhausted => break,
            };

            let next = state.next(event)?;
            info!("Transition {} -> {}", state, next);
            state = next;
        }

        let route = route
            .ok_or_else(|| AppError::Other("loop ended without a routing decision".to_string()))?;
        let status = if state == State::Accepted {
            RunStatus::Accepted
        } else {
            RunStatus::Exhausted
        };

        info!(
            "Finished ({:?}) after {} generation(s), {} document(s) in evidence",
            status,
            loop_state.retry_count,
            loop_state.evidence.len()
        );

        Ok(RunOutcome {
            answer: loop_state.generation,
            status,
            route,
            evidence_count: loop_state.evidence.len(),
            documents_considered: loop_state.documents_considered,
            used_web_search: loop_state.used_web_search,
            attempts: loop_state.retry_count,
        })
    }

    /// Ask the router where the first evidence should come from.
    pub async fn route(&self, question: &str) -> AppResult<RoutingDecision> {
        info!("Routing question");

        let response = self
            .structured(
                "router",
                &self.config.prompts.router,
                vars(&[("question", question)]),
            )
            .await?;
        let decision = decode_route(&response)?;

        info!("Routed question to {}", decision);
        Ok(decision)
    }

    /// Replace the evidence with the retriever's documents.
    pub async fn retrieve(&self, state: &mut LoopState) -> AppResult<()> {
        info!("Retrieving documents");

        let documents = self
            .guarded("retriever", self.config.retriever.fetch(&state.question))
            .await?;

        debug!("Retriever returned {} document(s)", documents.len());
        state.documents_considered += documents.len();
        state.evidence = documents;
        Ok(())
    }

    /// Append one document holding every web snippet, newline-joined.
    pub async fn search_web(&self, state: &mut LoopState) -> AppResult<()> {
        info!("Searching the web");

        let snippets = self
            .guarded("web search", self.config.web_search.fetch(&state.question))
            .await?;

        let content = snippets
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let urls: Vec<serde_json::Value> = snippets
            .iter()
            .filter(|s| !s.url.is_empty())
            .map(|s| serde_json::Value::from(s.url.clone()))
            .collect();

        debug!("Web search returned {} snippet(s)", snippets.len());

        state.evidence.push(
            Document::new(content)
                .with_metadata("source", "web_search")
                .with_metadata("urls", urls),
        );
        state.documents_considered += 1;
        state.used_web_search = true;
        Ok(())
    }

    /// Grade each document against the question.
    ///
    /// Returns the relevant documents in their original order, and whether
    /// any document was judged irrelevant.
    pub async fn grade_documents(
        &self,
        question: &str,
        evidence: Vec<Document>,
    ) -> AppResult<(Vec<Document>, bool)> {
        info!("Grading {} document(s) for relevance", evidence.len());

        let mut kept = Vec::with_capacity(evidence.len());
        let mut needs_web_search = false;

        for document in evidence {
            let response = self
                .structured(
                    "document grader",
                    &self.config.prompts.doc_grader,
                    vars(&[("document", document.content.as_str()), ("question", question)]),
                )
                .await?;

            match Relevance::from(decode_binary_score("document", &response)?) {
                Relevance::Relevant => {
                    debug!("Document relevant");
                    kept.push(document);
                }
                Relevance::NotRelevant => {
                    debug!("Document not relevant");
                    needs_web_search = true;
                }
            }
        }

        if needs_web_search {
            info!("Not all documents are relevant; including web search");
        }

        Ok((kept, needs_web_search))
    }

    /// Produce a new answer from the current evidence.
    pub async fn generate(&self, state: &mut LoopState) -> AppResult<()> {
        info!("Generating answer (attempt {})", state.retry_count + 1);

        let context = state.context();
        let built = build_prompt(
            &self.config.prompts.rag,
            vars(&[("context", context.as_str()), ("question", state.question.as_str())]),
        )?;

        let mut request = LlmRequest::new(built.user, &self.config.model)
            .with_temperature(self.config.temperature);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self
            .guarded("generator", self.config.generator.complete(&request))
            .await?;

        state.generation = response.content;
        state.retry_count += 1;
        Ok(())
    }

    /// Check groundedness, then usefulness, and apply the retry budget.
    pub async fn grade_answer(&self, state: &LoopState) -> AppResult<AnswerGrade> {
        info!("Checking answer for hallucinations");

        let context = state.context();
        let response = self
            .structured(
                "hallucination grader",
                &self.config.prompts.hallucination_grader,
                vars(&[("documents", context.as_str()), ("generation", state.generation.as_str())]),
            )
            .await?;

        let grade = match Groundedness::from(decode_binary_score("hallucination", &response)?) {
            Groundedness::NotGrounded => {
                debug!("Answer is not grounded in the evidence");
                grading::ungrounded(state.retry_count, state.max_retries)
            }
            Groundedness::Grounded => {
                debug!("Answer is grounded; grading it against the question");
                let response = self
                    .structured(
                        "answer grader",
                        &self.config.prompts.answer_grader,
                        vars(&[
                            ("question", state.question.as_str()),
                            ("generation", state.generation.as_str()),
                        ]),
                    )
                    .await?;
                let usefulness = Usefulness::from(decode_binary_score("answer", &response)?);
                grading::grounded(usefulness, state.retry_count, state.max_retries)
            }
        };

        info!("Answer graded: {}", grade);
        Ok(grade)
    }

    /// Render a template and call the generator in JSON mode.
    async fn structured(
        &self,
        operation: &str,
        template: &PromptTemplate,
        variables: HashMap<String, String>,
    ) -> AppResult<String> {
        let built = build_prompt(template, variables)?;

        let mut request = LlmRequest::new(built.user, &self.config.model)
            .with_temperature(self.config.temperature)
            .with_json_output();
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self
            .guarded(operation, self.config.generator.complete(&request))
            .await?;
        Ok(response.content)
    }

    /// Apply the configured call timeout to an external call.
    async fn guarded<T, F>(&self, operation: &str, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| AppError::Timeout {
                    operation: operation.to_string(),
                    secs: limit.as_secs(),
                })?,
            None => call.await,
        }
    }
}

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_joins_with_blank_line() {
        let mut state = LoopState::new("q", 3);
        state.evidence = vec![Document::new("first"), Document::new("second")];
        assert_eq!(state.context(), "first\n\nsecond");
    }

    #[test]
    fn test_outcome_json_keys() {
        let outcome = RunOutcome {
            answer: "42".to_string(),
            status: RunStatus::Accepted,
            route: RoutingDecision::UseRetriever,
            evidence_count: 3,
            documents_considered: 3,
            used_web_search: false,
            attempts: 1,
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "accepted");
        assert_eq!(json["route"], "vectorstore");
        assert_eq!(json["evidenceCount"], 3);
        assert_eq!(json["documentsConsidered"], 3);
        assert_eq!(json["usedWebSearch"], false);
    }
}
