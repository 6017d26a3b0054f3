//! Trend, recommendation, and comparison views over attempt history.
//!
//! Everything here is derived from stored `AttemptResult`s; nothing is
//! persisted and nothing is rounded.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::AttemptResult;

/// Categories scoring below this percentage get `High` priority.
pub const HIGH_PRIORITY_BELOW: f64 = 50.0;
/// Categories scoring below this percentage get `Medium` priority.
pub const MEDIUM_PRIORITY_BELOW: f64 = 70.0;
/// Default number of recommendations emitted for the latest attempt.
pub const DEFAULT_RECOMMENDATION_CAP: usize = 5;

/// Urgency of an improvement recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage < HIGH_PRIORITY_BELOW {
            Priority::High
        } else if percentage < MEDIUM_PRIORITY_BELOW {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// A pointer to one of the subject's weakest categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub percentage: f64,
    pub priority: Priority,
}

/// One attempt on the overall-score timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub attempt_number: u32,
    pub overall_percentage: f64,
    /// Change from the previous attempt; `None` for the first one.
    pub accuracy_change: Option<f64>,
    pub completed_at: DateTime<Utc>,
}

/// Headline figures over a subject's whole history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub attempts: usize,
    pub latest: f64,
    pub best: f64,
    pub mean: f64,
    /// Latest minus first overall percentage.
    pub net_change: f64,
}

/// Externally supplied reference scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Benchmarks {
    pub industry_average: f64,
    pub peer_average: f64,
    pub top_performer_average: f64,
}

/// Gap of the latest overall score to each benchmark (positive = ahead).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub overall_percentage: f64,
    pub industry_gap: f64,
    pub peer_gap: f64,
    pub top_performer_gap: f64,
}

/// Result of comparing two attempts category by category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub baseline_attempt: u32,
    pub current_attempt: u32,
    /// Change in overall percentage.
    pub overall_delta: f64,
    /// Categories whose score went up by more than the threshold.
    pub improvements: Vec<CategoryDelta>,
    /// Categories whose score went down by more than the threshold.
    pub regressions: Vec<CategoryDelta>,
    /// Categories with no significant change.
    pub unchanged: usize,
    /// Categories scored in current but not baseline.
    pub new_categories: Vec<String>,
    /// Categories scored in baseline but not current.
    pub removed_categories: Vec<String>,
}

impl ComparisonReport {
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

/// Per-category change between two attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDelta {
    pub category: String,
    pub baseline_percentage: f64,
    pub current_percentage: f64,
    pub delta: f64,
}

/// Derives dashboard and export views from an ordered result history.
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    recommendation_cap: usize,
}

impl Default for ReportAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_RECOMMENDATION_CAP)
    }
}

impl ReportAggregator {
    pub fn new(recommendation_cap: usize) -> Self {
        Self { recommendation_cap }
    }

    /// Overall score change of `history[index]` against its predecessor.
    pub fn accuracy_change(history: &[AttemptResult], index: usize) -> Option<f64> {
        if index == 0 || index >= history.len() {
            return None;
        }
        Some(history[index].overall_percentage - history[index - 1].overall_percentage)
    }

    /// The overall-score timeline, one point per result in history order.
    pub fn trend(&self, history: &[AttemptResult]) -> Vec<TrendPoint> {
        history
            .iter()
            .enumerate()
            .map(|(i, result)| TrendPoint {
                attempt_number: result.attempt_number,
                overall_percentage: result.overall_percentage,
                accuracy_change: Self::accuracy_change(history, i),
                completed_at: result.completed_at,
            })
            .collect()
    }

    pub fn summary(&self, history: &[AttemptResult]) -> Option<TrendSummary> {
        let first = history.first()?;
        let latest = history.last()?;
        let best = history
            .iter()
            .map(|r| r.overall_percentage)
            .fold(f64::NEG_INFINITY, f64::max);
        let mean =
            history.iter().map(|r| r.overall_percentage).sum::<f64>() / history.len() as f64;

        Some(TrendSummary {
            attempts: history.len(),
            latest: latest.overall_percentage,
            best,
            mean,
            net_change: latest.overall_percentage - first.overall_percentage,
        })
    }

    /// The weakest categories of `latest`, lowest first, at most the cap.
    ///
    /// Ties are broken by category label.
    pub fn recommendations(&self, latest: &AttemptResult) -> Vec<Recommendation> {
        let mut ranked: Vec<(&String, f64)> = latest
            .categories
            .iter()
            .map(|(category, score)| (category, score.percentage_score))
            .collect();
        ranked.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        ranked
            .into_iter()
            .take(self.recommendation_cap)
            .map(|(category, percentage)| Recommendation {
                category: category.clone(),
                percentage,
                priority: Priority::for_percentage(percentage),
            })
            .collect()
    }

    /// Compare `current` against `baseline` category by category.
    pub fn compare(
        &self,
        baseline: &AttemptResult,
        current: &AttemptResult,
        threshold: f64,
    ) -> ComparisonReport {
        let mut report = ComparisonReport {
            baseline_attempt: baseline.attempt_number,
            current_attempt: current.attempt_number,
            overall_delta: current.overall_percentage - baseline.overall_percentage,
            ..ComparisonReport::default()
        };

        for (category, score) in &current.categories {
            let Some(before) = baseline.categories.get(category) else {
                report.new_categories.push(category.clone());
                continue;
            };
            let delta = score.percentage_score - before.percentage_score;
            let change = CategoryDelta {
                category: category.clone(),
                baseline_percentage: before.percentage_score,
                current_percentage: score.percentage_score,
                delta,
            };
            if delta < -threshold {
                report.regressions.push(change);
            } else if delta > threshold {
                report.improvements.push(change);
            } else {
                report.unchanged += 1;
            }
        }

        let current_keys: BTreeSet<&String> = current.categories.keys().collect();
        report.removed_categories = baseline
            .categories
            .keys()
            .filter(|k| !current_keys.contains(k))
            .cloned()
            .collect();

        report
    }

    pub fn benchmark_comparison(
        &self,
        latest: &AttemptResult,
        benchmarks: &Benchmarks,
    ) -> BenchmarkComparison {
        let overall = latest.overall_percentage;
        BenchmarkComparison {
            overall_percentage: overall,
            industry_gap: overall - benchmarks.industry_average,
            peer_gap: overall - benchmarks.peer_average,
            top_performer_gap: overall - benchmarks.top_performer_average,
        }
    }
}
