//! Assessment and store error types.
//!
//! `StoreError` is defined here rather than next to the store
//! implementations so the tracker can classify conflicts and finalized
//! attempts without string matching.

use thiserror::Error;

use crate::model::Audience;

/// Errors returned by the assessment operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssessmentError {
    /// The catalog has no active questions for the audience.
    #[error("no active questions available for audience '{audience}'")]
    NoQuestionsAvailable { audience: Audience },

    /// The subject already used every allowed attempt.
    #[error("subject '{subject_id}' has reached the limit of {max_attempts} attempts")]
    AttemptLimitExceeded {
        subject_id: String,
        max_attempts: u32,
    },

    /// The question is not part of the attempt's snapshot.
    #[error("unknown question: {question_id}")]
    UnknownQuestion { question_id: String },

    /// The label is not one of the question's options.
    #[error("invalid option '{label}' for question {question_id}")]
    InvalidOptionLabel { question_id: String, label: String },

    /// The catalog gave an option a weight outside 0..=100.
    #[error("option '{label}' of question {question_id} has weight {weight}, above 100")]
    InvalidOptionWeight {
        question_id: String,
        label: String,
        weight: u8,
    },

    /// The attempt no longer accepts answers.
    #[error("attempt {attempt_number} of subject '{subject_id}' is already finalized")]
    AttemptAlreadyFinalized {
        subject_id: String,
        attempt_number: u32,
    },

    /// Some snapshot questions have no recorded answer.
    #[error("assessment incomplete: {} unanswered question(s): {}", .missing.len(), .missing.join(", "))]
    IncompleteAssessment { missing: Vec<String> },

    /// The subject has never started an attempt.
    #[error("subject not found: {subject_id}")]
    SubjectNotFound { subject_id: String },

    /// The subject exists but has no attempt with this number.
    #[error("subject '{subject_id}' has no attempt {attempt_number}")]
    UnknownAttempt {
        subject_id: String,
        attempt_number: u32,
    },

    /// The store could not complete the operation.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl AssessmentError {
    /// Returns `true` for errors the caller can fix by changing its input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AssessmentError::UnknownQuestion { .. }
                | AssessmentError::InvalidOptionLabel { .. }
                | AssessmentError::IncompleteAssessment { .. }
        )
    }

    /// Stable machine-readable code for API layers.
    pub fn code(&self) -> &'static str {
        match self {
            AssessmentError::NoQuestionsAvailable { .. } => "no_questions_available",
            AssessmentError::AttemptLimitExceeded { .. } => "attempt_limit_exceeded",
            AssessmentError::UnknownQuestion { .. } => "unknown_question",
            AssessmentError::InvalidOptionLabel { .. } => "invalid_option_label",
            AssessmentError::InvalidOptionWeight { .. } => "invalid_option_weight",
            AssessmentError::AttemptAlreadyFinalized { .. } => "attempt_already_finalized",
            AssessmentError::IncompleteAssessment { .. } => "incomplete_assessment",
            AssessmentError::SubjectNotFound { .. } => "subject_not_found",
            AssessmentError::UnknownAttempt { .. } => "unknown_attempt",
            AssessmentError::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

/// Errors reported by an `AssessmentStore`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No attempt is stored under the key.
    #[error("attempt not found")]
    NotFound,

    /// The attempt is finalized and rejects the write.
    #[error("attempt is finalized")]
    AttemptFinalized,

    /// A conditional write lost against a concurrent writer.
    #[error("conditional write conflict")]
    Conflict,

    /// The backing storage failed after the store's own retries.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AssessmentError {
    fn from(err: StoreError) -> Self {
        AssessmentError::StorageUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(AssessmentError::UnknownQuestion {
            question_id: "q9".into()
        }
        .is_validation());
        assert!(AssessmentError::IncompleteAssessment {
            missing: vec!["q1".into()]
        }
        .is_validation());
        assert!(!AssessmentError::StorageUnavailable("disk".into()).is_validation());
        assert!(!AssessmentError::InvalidOptionWeight {
            question_id: "q1".into(),
            label: "Yes".into(),
            weight: 101
        }
        .is_validation());
    }

    #[test]
    fn messages_carry_the_offending_identifiers() {
        let err = AssessmentError::InvalidOptionLabel {
            question_id: "pw-01".into(),
            label: "Maybe".into(),
        };
        assert_eq!(err.to_string(), "invalid option 'Maybe' for question pw-01");

        let err = AssessmentError::IncompleteAssessment {
            missing: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            err.to_string(),
            "assessment incomplete: 2 unanswered question(s): a, b"
        );

        let err = AssessmentError::AttemptLimitExceeded {
            subject_id: "alice".into(),
            max_attempts: 10,
        };
        assert!(err.to_string().contains("10 attempts"));
        assert_eq!(err.code(), "attempt_limit_exceeded");
    }
}
