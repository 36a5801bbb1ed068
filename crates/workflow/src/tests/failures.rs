//! Parse failures, collaborator failures and timeouts surface unchanged.

use super::support::*;
use crate::engine::RunOptions;
use arag_core::AppError;
use std::time::Duration;

fn grader_of(err: &AppError) -> &str {
    match err {
        AppError::Grading { grader, .. } => grader,
        other => panic!("expected grading error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_route_is_routing_error() {
    let h = Harness::scripted(&["I would use the vectorstore for this."]);

    let err = h
        .rag
        .run("What is prompt injection?", RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Routing(_)));
    assert!(err.is_parse_failure());
}

#[tokio::test]
async fn test_document_grading_parse_failure_stops_the_pass() {
    let h = Harness::scripted(&[ROUTE_RETRIEVER, YES, r#"{"score": "yes"}"#, YES]);

    let err = h
        .rag
        .run("What are the types of agent memory?", RunOptions::default())
        .await
        .unwrap_err();

    assert_eq!(grader_of(&err), "document");
    // The third document is never graded.
    assert_eq!(h.llm.call_count(), 3);
    assert_eq!(h.llm.remaining(), 1);
    assert_eq!(h.web.calls(), 0);
}

#[tokio::test]
async fn test_hallucination_grading_parse_failure() {
    let h = Harness::scripted(&[ROUTE_WEB, "answer", r#"{"binary_score": "mostly"}"#]);

    let err = h
        .rag
        .run("Who won?", RunOptions::default())
        .await
        .unwrap_err();

    assert_eq!(grader_of(&err), "hallucination");
}

#[tokio::test]
async fn test_answer_grading_parse_failure() {
    let h = Harness::scripted(&[ROUTE_WEB, "answer", YES, r#"{"binary_score": null}"#]);

    let err = h
        .rag
        .run("Who won?", RunOptions::default())
        .await
        .unwrap_err();

    assert_eq!(grader_of(&err), "answer");
}

#[tokio::test]
async fn test_retriever_failure_propagates() {
    let h = Harness::new(
        ScriptedLlm::new(&[ROUTE_RETRIEVER]),
        FakeRetriever::failing(),
        FakeWebSearch::new(&headlines()),
    );

    let err = h
        .rag
        .run("What are the types of agent memory?", RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Knowledge(ref m) if m == "index unavailable"));
    assert!(err.is_collaborator_failure());
    assert_eq!(h.retriever.calls(), 1);
    assert_eq!(h.web.calls(), 0);
}

#[tokio::test]
async fn test_web_search_failure_propagates_without_retry() {
    let h = Harness::new(
        ScriptedLlm::new(&[ROUTE_WEB]),
        FakeRetriever::new(&corpus()),
        FakeWebSearch::with_behavior(SearchBehavior::Fail),
    );

    let err = h
        .rag
        .run("Who won?", RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::WebSearch(_)));
    assert_eq!(h.web.calls(), 1);
}

#[tokio::test]
async fn test_generator_failure_propagates() {
    let h = Harness::new(
        ScriptedLlm::with_replies(vec![
            Reply::Text(ROUTE_WEB.to_string()),
            Reply::Fail("connection refused".to_string()),
        ]),
        FakeRetriever::new(&corpus()),
        FakeWebSearch::new(&headlines()),
    );

    let err = h
        .rag
        .run("Who won?", RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Llm(ref m) if m == "connection refused"));
    assert_eq!(h.llm.call_count(), 2);
}

#[tokio::test]
async fn test_hung_web_search_times_out() {
    let h = Harness::with_timeout(
        ScriptedLlm::new(&[ROUTE_WEB]),
        FakeRetriever::new(&corpus()),
        FakeWebSearch::with_behavior(SearchBehavior::Hang),
        Some(Duration::from_millis(50)),
    );

    let err = h
        .rag
        .run("Who won?", RunOptions::default())
        .await
        .unwrap_err();

    match &err {
        AppError::Timeout { operation, .. } => assert_eq!(operation, "web search"),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(err.is_collaborator_failure());
    assert!(!err.is_parse_failure());
}

#[tokio::test]
async fn test_hung_grader_times_out() {
    let h = Harness::with_timeout(
        ScriptedLlm::with_replies(vec![Reply::Text(ROUTE_RETRIEVER.to_string()), Reply::Hang]),
        FakeRetriever::new(&corpus()),
        FakeWebSearch::new(&headlines()),
        Some(Duration::from_millis(50)),
    );

    let err = h
        .rag
        .run("What are the types of agent memory?", RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Timeout { ref operation, .. } if operation == "document grader"));
}
