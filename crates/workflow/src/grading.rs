//! Retry policy applied to answer verdicts.
//!
//! The budget check is inclusive: with `max_retries = 3` a fourth generation
//! may still be graded as retryable, so at most `max_retries + 1`
//! generations happen per question.

use crate::types::{AnswerGrade, Usefulness};

/// Whether another generation attempt is allowed after `retry_count` so far.
pub fn within_budget(retry_count: u32, max_retries: u32) -> bool {
    retry_count <= max_retries
}

/// Grade for a generation that failed the groundedness check.
pub fn ungrounded(retry_count: u32, max_retries: u32) -> AnswerGrade {
    if within_budget(retry_count, max_retries) {
        AnswerGrade::NotSupported
    } else {
        AnswerGrade::MaxRetries
    }
}

/// Grade for a grounded generation given its usefulness verdict.
pub fn grounded(usefulness: Usefulness, retry_count: u32, max_retries: u32) -> AnswerGrade {
    match usefulness {
        Usefulness::Useful => AnswerGrade::Useful,
        Usefulness::NotUseful if within_budget(retry_count, max_retries) => {
            AnswerGrade::NotUseful
        }
        Usefulness::NotUseful => AnswerGrade::MaxRetries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_is_inclusive() {
        assert!(within_budget(0, 0));
        assert!(within_budget(3, 3));
        assert!(!within_budget(4, 3));
    }

    #[test]
    fn test_ungrounded_retries_until_budget() {
        assert_eq!(ungrounded(1, 1), AnswerGrade::NotSupported);
        assert_eq!(ungrounded(2, 1), AnswerGrade::MaxRetries);
    }

    #[test]
    fn test_useful_is_accepted_even_past_budget() {
        assert_eq!(grounded(Usefulness::Useful, 10, 3), AnswerGrade::Useful);
    }

    #[test]
    fn test_not_useful_requests_more_evidence() {
        assert_eq!(grounded(Usefulness::NotUseful, 2, 3), AnswerGrade::NotUseful);
        assert_eq!(grounded(Usefulness::NotUseful, 4, 3), AnswerGrade::MaxRetries);
    }
}
