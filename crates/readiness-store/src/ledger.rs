//! The per-subject attempt ledger shared by every store backend.
//!
//! Backends differ only in where the ledger lives and how access to it is
//! serialized; the conditional-write rules are all here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use readiness_core::error::StoreError;
use readiness_core::model::{AnswerRecord, Attempt, AttemptResult, AttemptState};
use readiness_core::traits::FinalizeCommit;

/// Current on-disk layout version.
pub const LEDGER_VERSION: u32 = 1;

/// All attempts, keyed by subject. Each subject's attempts are stored in
/// attempt-number order with no gaps, so attempt `n` lives at index `n - 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub version: u32,
    #[serde(default)]
    pub subjects: BTreeMap<String, Vec<Attempt>>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            version: LEDGER_VERSION,
            subjects: BTreeMap::new(),
        }
    }
}

impl Ledger {
    pub fn attempt_count(&self, subject_id: &str) -> u32 {
        self.subjects
            .get(subject_id)
            .map(|attempts| attempts.len() as u32)
            .unwrap_or(0)
    }

    pub fn insert_attempt(&mut self, attempt: Attempt) -> Result<(), StoreError> {
        let attempts = self.subjects.entry(attempt.subject_id.clone()).or_default();
        if attempt.attempt_number as usize != attempts.len() + 1 {
            return Err(StoreError::Conflict);
        }
        attempts.push(attempt);
        Ok(())
    }

    pub fn attempt(&self, subject_id: &str, attempt_number: u32) -> Option<&Attempt> {
        let index = (attempt_number as usize).checked_sub(1)?;
        self.subjects.get(subject_id)?.get(index)
    }

    fn attempt_mut(&mut self, subject_id: &str, attempt_number: u32) -> Option<&mut Attempt> {
        let index = (attempt_number as usize).checked_sub(1)?;
        self.subjects.get_mut(subject_id)?.get_mut(index)
    }

    pub fn upsert_answer(&mut self, record: AnswerRecord) -> Result<(), StoreError> {
        let attempt = self
            .attempt_mut(&record.subject_id, record.attempt_number)
            .ok_or(StoreError::NotFound)?;
        if attempt.is_finalized() {
            return Err(StoreError::AttemptFinalized);
        }
        attempt
            .answers
            .insert(record.question_id, record.option_label);
        attempt.revision += 1;
        Ok(())
    }

    pub fn commit_result(
        &mut self,
        result: AttemptResult,
        expected_revision: u64,
    ) -> Result<FinalizeCommit, StoreError> {
        let attempt = self
            .attempt_mut(&result.subject_id, result.attempt_number)
            .ok_or(StoreError::NotFound)?;

        if attempt.is_finalized() {
            return attempt
                .result
                .clone()
                .map(FinalizeCommit::AlreadyFinalized)
                .ok_or_else(|| {
                    StoreError::Unavailable(format!(
                        "attempt {} of {} is finalized without a result",
                        attempt.attempt_number, attempt.subject_id
                    ))
                });
        }
        if attempt.revision != expected_revision {
            return Err(StoreError::Conflict);
        }

        attempt.state = AttemptState::Finalized;
        attempt.result = Some(result.clone());
        Ok(FinalizeCommit::Committed(result))
    }

    pub fn history(&self, subject_id: &str) -> Vec<AttemptResult> {
        self.subjects
            .get(subject_id)
            .map(|attempts| {
                attempts
                    .iter()
                    .filter_map(|attempt| attempt.result.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use readiness_core::model::{AnswerOption, Audience, Question, ScoreCard};

    fn snapshot() -> Vec<Question> {
        vec![Question {
            id: "q1".into(),
            category: "Email".into(),
            text: "Do you check senders?".into(),
            weight: 5,
            audiences: vec![],
            active: true,
            options: vec![
                AnswerOption {
                    label: "Yes".into(),
                    weight: 100,
                },
                AnswerOption {
                    label: "No".into(),
                    weight: 0,
                },
            ],
        }]
    }

    fn answer(subject: &str, n: u32, label: &str) -> AnswerRecord {
        AnswerRecord {
            subject_id: subject.into(),
            attempt_number: n,
            question_id: "q1".into(),
            option_label: label.into(),
        }
    }

    fn result_for(attempt: &Attempt) -> AttemptResult {
        AttemptResult::new(
            attempt,
            ScoreCard {
                categories: BTreeMap::new(),
                overall_percentage: 100.0,
            },
            Utc::now(),
        )
    }

    #[test]
    fn insert_requires_next_number() {
        let mut ledger = Ledger::default();
        ledger
            .insert_attempt(Attempt::start("alice", 1, Audience::Individual, snapshot()))
            .unwrap();

        let skip = Attempt::start("alice", 3, Audience::Individual, snapshot());
        assert_eq!(ledger.insert_attempt(skip), Err(StoreError::Conflict));

        let dup = Attempt::start("alice", 1, Audience::Individual, snapshot());
        assert_eq!(ledger.insert_attempt(dup), Err(StoreError::Conflict));

        assert_eq!(ledger.attempt_count("alice"), 1);
        assert_eq!(ledger.attempt_count("bob"), 0);
    }

    #[test]
    fn answers_bump_revision_and_overwrite() {
        let mut ledger = Ledger::default();
        ledger
            .insert_attempt(Attempt::start("alice", 1, Audience::Individual, snapshot()))
            .unwrap();

        ledger.upsert_answer(answer("alice", 1, "No")).unwrap();
        ledger.upsert_answer(answer("alice", 1, "Yes")).unwrap();

        let attempt = ledger.attempt("alice", 1).unwrap();
        assert_eq!(attempt.answers["q1"], "Yes");
        assert_eq!(attempt.revision, 2);
        assert_eq!(
            ledger.upsert_answer(answer("alice", 2, "Yes")),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn commit_checks_revision_then_freezes() {
        let mut ledger = Ledger::default();
        ledger
            .insert_attempt(Attempt::start("alice", 1, Audience::Individual, snapshot()))
            .unwrap();
        ledger.upsert_answer(answer("alice", 1, "Yes")).unwrap();

        let attempt = ledger.attempt("alice", 1).unwrap().clone();
        let stale = result_for(&attempt);
        assert_eq!(
            ledger.commit_result(stale, 0),
            Err(StoreError::Conflict)
        );

        let first = result_for(&attempt);
        let committed = ledger.commit_result(first.clone(), 1).unwrap();
        assert_eq!(committed, FinalizeCommit::Committed(first.clone()));

        let second = result_for(&attempt);
        assert_eq!(
            ledger.commit_result(second, 1).unwrap(),
            FinalizeCommit::AlreadyFinalized(first.clone())
        );
        assert_eq!(
            ledger.upsert_answer(answer("alice", 1, "No")),
            Err(StoreError::AttemptFinalized)
        );
        assert_eq!(ledger.history("alice"), vec![first]);
    }

    #[test]
    fn attempt_zero_is_never_found() {
        let ledger = Ledger::default();
        assert!(ledger.attempt("alice", 0).is_none());
    }
}
