//! In-process store for tests and single-session runs.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use readiness_core::error::StoreError;
use readiness_core::model::{AnswerRecord, Attempt, AttemptResult};
use readiness_core::traits::{AssessmentStore, FinalizeCommit};

use crate::ledger::Ledger;

/// An `AssessmentStore` held entirely in memory.
///
/// Every operation runs under one lock, so conditional writes are atomic
/// across tasks and threads.
#[derive(Default)]
pub struct MemoryStore {
    ledger: Mutex<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Result<Ledger, StoreError> {
        Ok(self.ledger()?.clone())
    }

    fn ledger(&self) -> Result<MutexGuard<'_, Ledger>, StoreError> {
        self.ledger
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn attempt_count(&self, subject_id: &str) -> Result<u32, StoreError> {
        Ok(self.ledger()?.attempt_count(subject_id))
    }

    async fn insert_attempt(&self, attempt: Attempt) -> Result<(), StoreError> {
        self.ledger()?.insert_attempt(attempt)
    }

    async fn load_attempt(
        &self,
        subject_id: &str,
        attempt_number: u32,
    ) -> Result<Option<Attempt>, StoreError> {
        Ok(self.ledger()?.attempt(subject_id, attempt_number).cloned())
    }

    async fn upsert_answer(&self, record: AnswerRecord) -> Result<(), StoreError> {
        self.ledger()?.upsert_answer(record)
    }

    async fn commit_result(
        &self,
        result: AttemptResult,
        expected_revision: u64,
    ) -> Result<FinalizeCommit, StoreError> {
        self.ledger()?.commit_result(result, expected_revision)
    }

    async fn history(&self, subject_id: &str) -> Result<Vec<AttemptResult>, StoreError> {
        Ok(self.ledger()?.history(subject_id))
    }
}
