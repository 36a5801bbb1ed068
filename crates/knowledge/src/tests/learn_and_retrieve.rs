//! Learning a corpus and retrieving from it end to end, offline.

use crate::retriever::{IndexRetriever, Retriever};
use crate::types::LearnOptions;
use crate::{clean, learn, stats};
use arag_core::config::RetrieverConfig;
use arag_core::AppError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_corpus(dir: &Path) {
    fs::create_dir_all(dir.join("posts")).unwrap();
    fs::write(
        dir.join("posts/agents.md"),
        "# LLM Powered Agents\n\nAgent memory comes in short-term and long-term types. \
         Long-term memory uses an external vector store.",
    )
    .unwrap();
    fs::write(
        dir.join("posts/prompting.html"),
        "<html><body><h1>Prompt Engineering</h1><p>Chain of thought prompting asks \
         the model to reason step by step.</p></body></html>",
    )
    .unwrap();
    fs::write(
        dir.join("posts/attacks.txt"),
        "Adversarial attacks on LLMs include jailbreak prompts and token manipulation.",
    )
    .unwrap();
    fs::write(dir.join("posts/blob.bin"), b"\x00\x01\x02binary").unwrap();
}

fn learn_options(corpus: &Path) -> LearnOptions {
    LearnOptions {
        base_name: "default".to_string(),
        paths: vec![corpus.to_path_buf()],
        include: vec![],
        exclude: vec![],
        reset: false,
        embedding_provider: Some("trigram".to_string()),
        embedding_model: Some("trigram-v1".to_string()),
    }
}

fn retriever_config(k: usize) -> RetrieverConfig {
    RetrieverConfig {
        k,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_learn_then_retrieve() {
    let workspace = TempDir::new().unwrap();
    let corpus = workspace.path().join("corpus");
    write_corpus(&corpus);

    let result = learn(workspace.path(), learn_options(&corpus), None)
        .await
        .unwrap();
    assert_eq!(result.sources_count, 3);
    assert_eq!(result.chunks_count, 3);
    assert_eq!(result.skipped.len(), 1);
    assert!(result.skipped[0].ends_with("blob.bin"));

    let base = stats(workspace.path(), "default").unwrap();
    assert_eq!(base.sources_count, 3);
    assert_eq!(base.chunks_count, 3);
    assert!(base.last_learn_at.is_some());

    let retriever = IndexRetriever::open(workspace.path(), &retriever_config(2), None).unwrap();
    let docs = retriever
        .fetch("What are the types of agent memory?")
        .await
        .unwrap();

    assert_eq!(docs.len(), 2);
    assert!(docs[0].content.contains("Agent memory"));
    assert!(docs[0].metadata_str("source").unwrap().ends_with("agents.md"));
    assert!(docs[0].metadata.contains_key("chunk_id"));
    assert!(docs[0].metadata.contains_key("score"));
}

#[tokio::test]
async fn test_html_is_cleaned_before_indexing() {
    let workspace = TempDir::new().unwrap();
    let corpus = workspace.path().join("corpus");
    write_corpus(&corpus);

    let mut options = learn_options(&corpus);
    options.include = vec![".html".to_string()];
    learn(workspace.path(), options, None).await.unwrap();

    let retriever = IndexRetriever::open(workspace.path(), &retriever_config(3), None).unwrap();
    let docs = retriever.fetch("chain of thought").await.unwrap();

    assert_eq!(docs.len(), 1);
    assert!(!docs[0].content.contains('<'));
    assert!(docs[0].content.contains("Chain of thought prompting"));
}

#[tokio::test]
async fn test_switching_embedder_requires_reset() {
    let workspace = TempDir::new().unwrap();
    let corpus = workspace.path().join("corpus");
    write_corpus(&corpus);

    learn(workspace.path(), learn_options(&corpus), None)
        .await
        .unwrap();

    let mut options = learn_options(&corpus);
    options.embedding_provider = Some("ollama".to_string());
    options.embedding_model = Some("nomic-embed-text".to_string());
    let err = learn(workspace.path(), options, None).await.unwrap_err();
    assert!(err.to_string().contains("--reset"));
}

#[tokio::test]
async fn test_clean_empties_base() {
    let workspace = TempDir::new().unwrap();
    let corpus = workspace.path().join("corpus");
    write_corpus(&corpus);

    learn(workspace.path(), learn_options(&corpus), None)
        .await
        .unwrap();
    clean(workspace.path(), "default").unwrap();

    let base = stats(workspace.path(), "default").unwrap();
    assert_eq!(base.chunks_count, 0);

    let retriever = IndexRetriever::open(workspace.path(), &retriever_config(3), None).unwrap();
    assert!(retriever.fetch("agents").await.unwrap().is_empty());
}

#[test]
fn test_missing_base_is_knowledge_error() {
    let workspace = TempDir::new().unwrap();

    let err = IndexRetriever::open(workspace.path(), &retriever_config(3), None).unwrap_err();
    assert!(matches!(err, AppError::Knowledge(_)));

    assert!(stats(workspace.path(), "nope").is_err());
    assert!(clean(workspace.path(), "nope").is_err());
}

#[tokio::test]
async fn test_missing_path_is_rejected() {
    let workspace = TempDir::new().unwrap();
    let options = learn_options(&workspace.path().join("does-not-exist"));

    let err = learn(workspace.path(), options, None).await.unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}
