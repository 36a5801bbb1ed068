//! Scripted in-process collaborators.

use crate::engine::{AdaptiveRag, LoopConfig};
use arag_core::{AppError, AppResult};
use arag_knowledge::{Document, Retriever, WebSearch, WebSnippet};
use arag_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use arag_prompt::PromptSet;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ROUTE_RETRIEVER: &str = r#"{"datasource": "vectorstore"}"#;
pub const ROUTE_WEB: &str = r#"{"datasource": "websearch"}"#;
pub const YES: &str = r#"{"binary_score": "yes"}"#;
pub const NO: &str = r#"{"binary_score": "no"}"#;

pub enum Reply {
    Text(String),
    Fail(String),
    Hang,
}

/// Generator that answers from a fixed script and records every request.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(script: &[&str]) -> Arc<Self> {
        Self::with_replies(script.iter().map(|s| Reply::Text(s.to_string())).collect())
    }

    pub fn with_replies(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    /// Prompts of the unstructured (answer-generation) calls.
    pub fn generation_prompts(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| !r.is_structured())
            .map(|r| r.prompt)
            .collect()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();

        match reply {
            Some(Reply::Text(content)) => Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::new(10, 5),
            }),
            Some(Reply::Fail(message)) => Err(AppError::Llm(message)),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AppError::Llm("woke from hang".to_string()))
            }
            None => Err(AppError::Llm("script exhausted".to_string())),
        }
    }
}

/// Retriever returning the same documents on every call.
pub struct FakeRetriever {
    documents: Vec<Document>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeRetriever {
    pub fn new(contents: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            documents: contents.iter().map(|c| Document::new(*c)).collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            documents: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Retriever for FakeRetriever {
    async fn fetch(&self, _query: &str) -> AppResult<Vec<Document>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Knowledge("index unavailable".to_string()));
        }
        Ok(self.documents.clone())
    }
}

pub enum SearchBehavior {
    Snippets(Vec<WebSnippet>),
    Fail,
    Hang,
}

pub struct FakeWebSearch {
    behavior: SearchBehavior,
    calls: AtomicUsize,
}

impl FakeWebSearch {
    pub fn new(contents: &[&str]) -> Arc<Self> {
        let snippets = contents
            .iter()
            .enumerate()
            .map(|(i, c)| WebSnippet {
                content: c.to_string(),
                url: format!("https://news.example/{}", i),
                title: format!("Result {}", i),
            })
            .collect();
        Self::with_behavior(SearchBehavior::Snippets(snippets))
    }

    pub fn with_behavior(behavior: SearchBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WebSearch for FakeWebSearch {
    async fn fetch(&self, _query: &str) -> AppResult<Vec<WebSnippet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            SearchBehavior::Snippets(snippets) => Ok(snippets.clone()),
            SearchBehavior::Fail => Err(AppError::WebSearch("search quota exceeded".to_string())),
            SearchBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

pub fn corpus() -> Vec<&'static str> {
    vec![
        "Agent memory: short-term memory is in-context learning.",
        "Long-term memory uses an external vector store with fast retrieval.",
        "Memory stream records agent observations in natural language.",
    ]
}

pub fn headlines() -> Vec<&'static str> {
    vec![
        "The Bears selected Caleb Williams first overall.",
        "Williams played quarterback at USC.",
        "The draft took place in Detroit.",
    ]
}

pub struct Harness {
    pub llm: Arc<ScriptedLlm>,
    pub retriever: Arc<FakeRetriever>,
    pub web: Arc<FakeWebSearch>,
    pub rag: AdaptiveRag,
}

impl Harness {
    pub fn new(llm: Arc<ScriptedLlm>, retriever: Arc<FakeRetriever>, web: Arc<FakeWebSearch>) -> Self {
        Self::with_timeout(llm, retriever, web, None)
    }

    pub fn with_timeout(
        llm: Arc<ScriptedLlm>,
        retriever: Arc<FakeRetriever>,
        web: Arc<FakeWebSearch>,
        call_timeout: Option<Duration>,
    ) -> Self {
        let config = LoopConfig {
            generator: llm.clone(),
            model: "llama3.2:3b-instruct-fp16".to_string(),
            temperature: 0.0,
            retriever: retriever.clone(),
            web_search: web.clone(),
            prompts: PromptSet::default(),
            max_retries: 3,
            call_timeout,
        };

        Self {
            llm,
            retriever,
            web,
            rag: AdaptiveRag::new(config),
        }
    }

    /// Default retriever and web search with the given generator script.
    pub fn scripted(script: &[&str]) -> Self {
        Self::new(
            ScriptedLlm::new(script),
            FakeRetriever::new(&corpus()),
            FakeWebSearch::new(&headlines()),
        )
    }
}
