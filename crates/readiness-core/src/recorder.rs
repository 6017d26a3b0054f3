//! Answer capture for in-progress attempts.

use std::sync::Arc;

use crate::error::{AssessmentError, StoreError};
use crate::model::AnswerRecord;
use crate::tracker::fetch_attempt;
use crate::traits::AssessmentStore;

/// Validates and upserts selected options. Never scores.
pub struct AnswerRecorder {
    store: Arc<dyn AssessmentStore>,
}

impl AnswerRecorder {
    pub fn new(store: Arc<dyn AssessmentStore>) -> Self {
        Self { store }
    }

    /// Record (or overwrite) the selected option for one question.
    pub async fn record_answer(
        &self,
        subject_id: &str,
        attempt_number: u32,
        question_id: &str,
        option_label: &str,
    ) -> Result<(), AssessmentError> {
        let attempt = fetch_attempt(self.store.as_ref(), subject_id, attempt_number).await?;
        let finalized = || AssessmentError::AttemptAlreadyFinalized {
            subject_id: subject_id.to_string(),
            attempt_number,
        };

        if attempt.is_finalized() {
            return Err(finalized());
        }

        let question =
            attempt
                .question(question_id)
                .ok_or_else(|| AssessmentError::UnknownQuestion {
                    question_id: question_id.to_string(),
                })?;
        if question.option(option_label).is_none() {
            return Err(AssessmentError::InvalidOptionLabel {
                question_id: question_id.to_string(),
                label: option_label.to_string(),
            });
        }

        let record = AnswerRecord {
            subject_id: subject_id.to_string(),
            attempt_number,
            question_id: question_id.to_string(),
            option_label: option_label.to_string(),
        };
        match self.store.upsert_answer(record).await {
            Ok(()) => {
                tracing::debug!(
                    "{subject_id}/{attempt_number}: {question_id} = {option_label}"
                );
                Ok(())
            }
            // Finalized between our read and the write.
            Err(StoreError::AttemptFinalized) => Err(finalized()),
            Err(StoreError::NotFound) => Err(AssessmentError::UnknownAttempt {
                subject_id: subject_id.to_string(),
                attempt_number,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Recorded answers of an attempt, ordered by question id.
    pub async fn answers(
        &self,
        subject_id: &str,
        attempt_number: u32,
    ) -> Result<Vec<AnswerRecord>, AssessmentError> {
        let attempt = fetch_attempt(self.store.as_ref(), subject_id, attempt_number).await?;
        Ok(attempt.answer_records())
    }
}
