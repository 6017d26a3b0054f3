//! The assessment facade used by front ends.
//!
//! Wires a question catalog and an assessment store to the tracker,
//! recorder, and report aggregator behind one set of subject-level calls.

use std::sync::Arc;

use crate::error::AssessmentError;
use crate::model::{AnswerRecord, Attempt, AttemptProgress, AttemptResult, Audience};
use crate::recorder::AnswerRecorder;
use crate::report::{
    BenchmarkComparison, Benchmarks, ComparisonReport, Recommendation, ReportAggregator,
    TrendPoint, TrendSummary, DEFAULT_RECOMMENDATION_CAP,
};
use crate::tracker::{fetch_attempt, AttemptTracker, DEFAULT_MAX_ATTEMPTS};
use crate::traits::{AssessmentStore, QuestionCatalog};

/// Configuration for the assessment service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Attempts allowed per subject.
    pub max_attempts: u32,
    /// Maximum number of recommendations returned.
    pub recommendation_cap: usize,
    /// Audience used by [`AssessmentService::start_attempt`].
    pub default_audience: Audience,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            recommendation_cap: DEFAULT_RECOMMENDATION_CAP,
            default_audience: Audience::Individual,
        }
    }
}

pub struct AssessmentService {
    store: Arc<dyn AssessmentStore>,
    tracker: AttemptTracker,
    recorder: AnswerRecorder,
    aggregator: ReportAggregator,
    config: ServiceConfig,
}

impl AssessmentService {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        catalog: Arc<dyn QuestionCatalog>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            tracker: AttemptTracker::new(store.clone(), catalog, config.max_attempts),
            recorder: AnswerRecorder::new(store.clone()),
            aggregator: ReportAggregator::new(config.recommendation_cap),
            store,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Start the subject's next attempt for the default audience.
    pub async fn start_attempt(&self, subject_id: &str) -> Result<u32, AssessmentError> {
        self.tracker
            .start_attempt(subject_id, self.config.default_audience)
            .await
    }

    pub async fn start_attempt_for(
        &self,
        subject_id: &str,
        audience: Audience,
    ) -> Result<u32, AssessmentError> {
        self.tracker.start_attempt(subject_id, audience).await
    }

    pub async fn record_answer(
        &self,
        subject_id: &str,
        attempt_number: u32,
        question_id: &str,
        option_label: &str,
    ) -> Result<(), AssessmentError> {
        self.recorder
            .record_answer(subject_id, attempt_number, question_id, option_label)
            .await
    }

    pub async fn finalize(
        &self,
        subject_id: &str,
        attempt_number: u32,
    ) -> Result<AttemptResult, AssessmentError> {
        self.tracker.finalize(subject_id, attempt_number).await
    }

    /// The full attempt, including its question snapshot.
    pub async fn attempt(
        &self,
        subject_id: &str,
        attempt_number: u32,
    ) -> Result<Attempt, AssessmentError> {
        fetch_attempt(self.store.as_ref(), subject_id, attempt_number).await
    }

    pub async fn progress(
        &self,
        subject_id: &str,
        attempt_number: u32,
    ) -> Result<AttemptProgress, AssessmentError> {
        self.tracker.progress(subject_id, attempt_number).await
    }

    pub async fn answers(
        &self,
        subject_id: &str,
        attempt_number: u32,
    ) -> Result<Vec<AnswerRecord>, AssessmentError> {
        self.recorder.answers(subject_id, attempt_number).await
    }

    /// Finalized results ordered by attempt number.
    ///
    /// A subject with attempts but no finalized result gets an empty list;
    /// a subject with no attempts at all is `SubjectNotFound`.
    pub async fn history(&self, subject_id: &str) -> Result<Vec<AttemptResult>, AssessmentError> {
        let history = self.store.history(subject_id).await?;
        if history.is_empty() && self.store.attempt_count(subject_id).await? == 0 {
            return Err(AssessmentError::SubjectNotFound {
                subject_id: subject_id.to_string(),
            });
        }
        Ok(history)
    }

    /// Weakest categories of the latest finalized attempt.
    pub async fn recommendations(
        &self,
        subject_id: &str,
    ) -> Result<Vec<Recommendation>, AssessmentError> {
        let history = self.history(subject_id).await?;
        Ok(history
            .last()
            .map(|latest| self.aggregator.recommendations(latest))
            .unwrap_or_default())
    }

    pub async fn trend(&self, subject_id: &str) -> Result<Vec<TrendPoint>, AssessmentError> {
        let history = self.history(subject_id).await?;
        Ok(self.aggregator.trend(&history))
    }

    pub async fn summary(
        &self,
        subject_id: &str,
    ) -> Result<Option<TrendSummary>, AssessmentError> {
        let history = self.history(subject_id).await?;
        Ok(self.aggregator.summary(&history))
    }

    /// Compare the two most recent finalized attempts.
    ///
    /// `None` until the subject has at least two results.
    pub async fn compare_latest(
        &self,
        subject_id: &str,
        threshold: f64,
    ) -> Result<Option<ComparisonReport>, AssessmentError> {
        let history = self.history(subject_id).await?;
        let report = match history.as_slice() {
            [.., baseline, current] => Some(self.aggregator.compare(baseline, current, threshold)),
            _ => None,
        };
        Ok(report)
    }

    pub async fn benchmark_comparison(
        &self,
        subject_id: &str,
        benchmarks: &Benchmarks,
    ) -> Result<Option<BenchmarkComparison>, AssessmentError> {
        let history = self.history(subject_id).await?;
        Ok(history
            .last()
            .map(|latest| self.aggregator.benchmark_comparison(latest, benchmarks)))
    }
}
