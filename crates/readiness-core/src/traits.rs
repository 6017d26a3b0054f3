//! Collaborator traits for question sources and attempt storage.
//!
//! The catalog is implemented in `crate::catalog`; stores live in the
//! `readiness-store` crate.

use async_trait::async_trait;

use crate::error::{AssessmentError, StoreError};
use crate::model::{AnswerRecord, Attempt, AttemptResult, Audience, Question};

// ---------------------------------------------------------------------------
// Question source
// ---------------------------------------------------------------------------

/// Source of the questions an attempt is snapshotted from.
#[async_trait]
pub trait QuestionCatalog: Send + Sync {
    /// Active questions for the audience, ordered by id and never empty.
    ///
    /// Fails with `NoQuestionsAvailable` when nothing applies.
    async fn active_questions(&self, audience: Audience) -> Result<Vec<Question>, AssessmentError>;
}

// ---------------------------------------------------------------------------
// Attempt store
// ---------------------------------------------------------------------------

/// Outcome of a finalize commit.
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeCommit {
    /// This call moved the attempt to finalized and stored the result.
    Committed(AttemptResult),
    /// The attempt was already finalized; carries the stored result.
    AlreadyFinalized(AttemptResult),
}

impl FinalizeCommit {
    pub fn into_result(self) -> AttemptResult {
        match self {
            FinalizeCommit::Committed(result) | FinalizeCommit::AlreadyFinalized(result) => result,
        }
    }
}

/// Durable storage for attempts, answers, and result history.
///
/// Every mutating method is a conditional write scoped to one subject. The
/// store is the only place the core suspends.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Human-readable store name (e.g. "memory").
    fn name(&self) -> &str;

    /// Number of attempts ever allocated to the subject, in any state.
    async fn attempt_count(&self, subject_id: &str) -> Result<u32, StoreError>;

    /// Insert a new attempt.
    ///
    /// Succeeds only if `attempt.attempt_number` equals the subject's current
    /// count plus one; otherwise returns `Conflict` and stores nothing.
    async fn insert_attempt(&self, attempt: Attempt) -> Result<(), StoreError>;

    /// Load an attempt by key.
    async fn load_attempt(
        &self,
        subject_id: &str,
        attempt_number: u32,
    ) -> Result<Option<Attempt>, StoreError>;

    /// Upsert a selected option on an in-progress attempt.
    ///
    /// Returns `NotFound` for a missing attempt and `AttemptFinalized` once
    /// the attempt no longer accepts answers. Bumps the attempt revision.
    async fn upsert_answer(&self, record: AnswerRecord) -> Result<(), StoreError>;

    /// Store `result` and finalize its attempt in one step.
    ///
    /// The write applies only while the attempt is in progress at
    /// `expected_revision`. An already finalized attempt yields
    /// `AlreadyFinalized` with the stored result; a revision mismatch yields
    /// `Conflict`.
    async fn commit_result(
        &self,
        result: AttemptResult,
        expected_revision: u64,
    ) -> Result<FinalizeCommit, StoreError>;

    /// Finalized results of the subject, ordered by attempt number.
    async fn history(&self, subject_id: &str) -> Result<Vec<AttemptResult>, StoreError>;
}
