//! The control loop's finite-state machine.
//!
//! ```text
//! Routing           --vectorstore-->       Retrieving
//! Routing           --websearch-->         SearchingWeb
//! Retrieving        --retrieved-->         GradingDocuments
//! GradingDocuments  --needs web search-->  SearchingWeb
//! GradingDocuments  --all relevant-->      Generating
//! SearchingWeb      --searched-->          Generating
//! Generating        --generated-->         GradingAnswer
//! GradingAnswer     --not supported-->     Generating
//! GradingAnswer     --not useful-->        SearchingWeb
//! GradingAnswer     --useful-->            Accepted
//! GradingAnswer     --max retries-->       Exhausted
//! ```

use crate::types::{AnswerGrade, RoutingDecision};
use arag_core::{AppError, AppResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Routing,
    Retrieving,
    SearchingWeb,
    GradingDocuments,
    Generating,
    GradingAnswer,
    Accepted,
    Exhausted,
}

/// What the work done in a state produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Routed(RoutingDecision),
    Retrieved,
    Searched,
    DocumentsGraded { needs_web_search: bool },
    Generated,
    AnswerGraded(AnswerGrade),
}

impl State {
    /// The transition table.
    pub fn next(self, event: Event) -> AppResult<State> {
        use State::*;

        let next = match (self, event) {
            (Routing, Event::Routed(RoutingDecision::UseRetriever)) => Retrieving,
            (Routing, Event::Routed(RoutingDecision::UseWebSearch)) => SearchingWeb,
            (Retrieving, Event::Retrieved) => GradingDocuments,
            (GradingDocuments, Event::DocumentsGraded { needs_web_search: true }) => SearchingWeb,
            (GradingDocuments, Event::DocumentsGraded { needs_web_search: false }) => Generating,
            (SearchingWeb, Event::Searched) => Generating,
            (Generating, Event::Generated) => GradingAnswer,
            (GradingAnswer, Event::AnswerGraded(AnswerGrade::NotSupported)) => Generating,
            (GradingAnswer, Event::AnswerGraded(AnswerGrade::NotUseful)) => SearchingWeb,
            (GradingAnswer, Event::AnswerGraded(AnswerGrade::Useful)) => Accepted,
            (GradingAnswer, Event::AnswerGraded(AnswerGrade::MaxRetries)) => Exhausted,
            (state, event) => {
                return Err(AppError::Other(format!(
                    "illegal transition: {:?} in state {}",
                    event, state
                )))
            }
        };

        Ok(next)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, State::Accepted | State::Exhausted)
    }

    pub fn name(self) -> &'static str {
        match self {
            State::Routing => "routing",
            State::Retrieving => "retrieving",
            State::SearchingWeb => "searching_web",
            State::GradingDocuments => "grading_documents",
            State::Generating => "generating",
            State::GradingAnswer => "grading_answer",
            State::Accepted => "accepted",
            State::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
