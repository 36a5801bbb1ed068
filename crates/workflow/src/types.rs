//! Decisions and verdicts produced while answering one question.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the first evidence comes from. Decided once per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingDecision {
    #[serde(rename = "vectorstore")]
    UseRetriever,
    #[serde(rename = "websearch")]
    UseWebSearch,
}

impl RoutingDecision {
    /// The `datasource` literal the router answers with.
    pub fn tag(&self) -> &'static str {
        match self {
            RoutingDecision::UseRetriever => "vectorstore",
            RoutingDecision::UseWebSearch => "websearch",
        }
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    Relevant,
    NotRelevant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Groundedness {
    Grounded,
    NotGrounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usefulness {
    Useful,
    NotUseful,
}

impl From<bool> for Relevance {
    fn from(yes: bool) -> Self {
        if yes {
            Relevance::Relevant
        } else {
            Relevance::NotRelevant
        }
    }
}

impl From<bool> for Groundedness {
    fn from(yes: bool) -> Self {
        if yes {
            Groundedness::Grounded
        } else {
            Groundedness::NotGrounded
        }
    }
}

impl From<bool> for Usefulness {
    fn from(yes: bool) -> Self {
        if yes {
            Usefulness::Useful
        } else {
            Usefulness::NotUseful
        }
    }
}

/// Outcome of grading one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerGrade {
    /// Grounded and answers the question
    Useful,
    /// Not grounded in the evidence; regenerate
    NotSupported,
    /// Grounded but off the question; gather more evidence
    NotUseful,
    /// Retry budget spent
    MaxRetries,
}

impl fmt::Display for AnswerGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnswerGrade::Useful => "useful",
            AnswerGrade::NotSupported => "not supported",
            AnswerGrade::NotUseful => "not useful",
            AnswerGrade::MaxRetries => "max retries",
        };
        f.write_str(name)
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// The answer passed both graders
    Accepted,
    /// Best-effort answer returned after the retry budget ran out
    Exhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_decision_serializes_as_tag() {
        let json = serde_json::to_string(&RoutingDecision::UseWebSearch).unwrap();
        assert_eq!(json, "\"websearch\"");
        assert_eq!(RoutingDecision::UseRetriever.to_string(), "vectorstore");
    }

    #[test]
    fn test_verdicts_from_bool() {
        assert_eq!(Relevance::from(true), Relevance::Relevant);
        assert_eq!(Groundedness::from(false), Groundedness::NotGrounded);
        assert_eq!(Usefulness::from(false), Usefulness::NotUseful);
    }

    #[test]
    fn test_run_status_serialization() {
        assert_eq!(
            serde_json::to_string(&RunStatus::Exhausted).unwrap(),
            "\"exhausted\""
        );
    }
}
