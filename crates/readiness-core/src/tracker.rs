//! Attempt allocation and the in-progress → finalized transition.
//!
//! Both operations are optimistic: they read, decide, and then issue a
//! conditional write that the store rejects with `Conflict` if another
//! caller got there first.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{AssessmentError, StoreError};
use crate::model::{Attempt, AttemptProgress, AttemptResult, Audience};
use crate::scoring;
use crate::traits::{AssessmentStore, FinalizeCommit, QuestionCatalog};

/// Attempts allowed per subject unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Finalize rounds lost to concurrent answer writes before giving up.
const MAX_FINALIZE_ROUNDS: u32 = 8;

/// Owns attempt numbering and the finalize state machine.
pub struct AttemptTracker {
    store: Arc<dyn AssessmentStore>,
    catalog: Arc<dyn QuestionCatalog>,
    max_attempts: u32,
}

impl AttemptTracker {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        catalog: Arc<dyn QuestionCatalog>,
        max_attempts: u32,
    ) -> Self {
        Self {
            store,
            catalog,
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Allocate the next attempt number and open an in-progress attempt.
    ///
    /// A subject at the limit is refused before the catalog is consulted.
    /// The snapshot is taken before allocation so a catalog failure never
    /// consumes a number.
    pub async fn start_attempt(
        &self,
        subject_id: &str,
        audience: Audience,
    ) -> Result<u32, AssessmentError> {
        let mut count = self.store.attempt_count(subject_id).await?;
        self.check_limit(subject_id, count)?;
        let snapshot = self.catalog.active_questions(audience).await?;

        // Every conflict means someone else allocated a number, so the count
        // reaches the limit within `max_attempts + 1` rounds.
        for round in 0..=self.max_attempts {
            if round > 0 {
                count = self.store.attempt_count(subject_id).await?;
                self.check_limit(subject_id, count)?;
            }

            let number = count + 1;
            let attempt = Attempt::start(subject_id, number, audience, snapshot.clone());
            match self.store.insert_attempt(attempt).await {
                Ok(()) => {
                    tracing::info!(
                        "subject {subject_id} started attempt {number} ({} questions, {audience})",
                        snapshot.len()
                    );
                    return Ok(number);
                }
                Err(StoreError::Conflict) => {
                    tracing::debug!("attempt {number} of {subject_id} taken concurrently, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AssessmentError::StorageUnavailable(format!(
            "attempt allocation for {subject_id} did not settle"
        )))
    }

    /// Score and finalize an attempt, or return its stored result.
    ///
    /// Fails with `IncompleteAssessment` while any snapshot question is
    /// unanswered; the attempt then stays in progress.
    pub async fn finalize(
        &self,
        subject_id: &str,
        attempt_number: u32,
    ) -> Result<AttemptResult, AssessmentError> {
        for _ in 0..MAX_FINALIZE_ROUNDS {
            let attempt = fetch_attempt(self.store.as_ref(), subject_id, attempt_number).await?;

            if attempt.is_finalized() {
                return attempt.result.ok_or_else(|| {
                    AssessmentError::StorageUnavailable(format!(
                        "attempt {attempt_number} of {subject_id} is finalized without a result"
                    ))
                });
            }

            let card = match scoring::score(&attempt.snapshot, &attempt.answers) {
                Ok(card) => card,
                Err(e) => {
                    tracing::warn!("finalize of {subject_id}/{attempt_number} rejected: {e}");
                    return Err(e);
                }
            };
            let result = AttemptResult::new(&attempt, card, Utc::now());

            match self.store.commit_result(result, attempt.revision).await {
                Ok(FinalizeCommit::Committed(result)) => {
                    tracing::info!(
                        "subject {subject_id} finalized attempt {attempt_number}: {:.2}%",
                        result.overall_percentage
                    );
                    return Ok(result);
                }
                Ok(FinalizeCommit::AlreadyFinalized(result)) => return Ok(result),
                Err(StoreError::Conflict) => {
                    tracing::debug!(
                        "answers of {subject_id}/{attempt_number} changed while scoring, rescoring"
                    );
                }
                Err(StoreError::NotFound) => {
                    return Err(AssessmentError::UnknownAttempt {
                        subject_id: subject_id.to_string(),
                        attempt_number,
                    })
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AssessmentError::StorageUnavailable(format!(
            "finalize of {subject_id}/{attempt_number} kept conflicting with answer writes"
        )))
    }

    fn check_limit(&self, subject_id: &str, count: u32) -> Result<(), AssessmentError> {
        if count < self.max_attempts {
            return Ok(());
        }
        tracing::warn!(
            "subject {subject_id} refused a new attempt: {count}/{} used",
            self.max_attempts
        );
        Err(AssessmentError::AttemptLimitExceeded {
            subject_id: subject_id.to_string(),
            max_attempts: self.max_attempts,
        })
    }

    pub async fn progress(
        &self,
        subject_id: &str,
        attempt_number: u32,
    ) -> Result<AttemptProgress, AssessmentError> {
        let attempt = fetch_attempt(self.store.as_ref(), subject_id, attempt_number).await?;
        let missing = attempt.missing_answers();
        Ok(AttemptProgress {
            subject_id: attempt.subject_id.clone(),
            attempt_number,
            state: attempt.state,
            answered: attempt.snapshot.len() - missing.len(),
            total: attempt.snapshot.len(),
            missing,
        })
    }
}

/// Load an attempt, telling an unknown subject apart from an unknown number.
pub(crate) async fn fetch_attempt(
    store: &dyn AssessmentStore,
    subject_id: &str,
    attempt_number: u32,
) -> Result<Attempt, AssessmentError> {
    if let Some(attempt) = store.load_attempt(subject_id, attempt_number).await? {
        return Ok(attempt);
    }
    if store.attempt_count(subject_id).await? == 0 {
        Err(AssessmentError::SubjectNotFound {
            subject_id: subject_id.to_string(),
        })
    } else {
        Err(AssessmentError::UnknownAttempt {
            subject_id: subject_id.to_string(),
            attempt_number,
        })
    }
}
