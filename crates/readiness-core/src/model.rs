//! Core data model types for readiness.
//!
//! These are the fundamental types the whole system uses to represent
//! questions, attempts, recorded answers, and scored results.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest weight an answer option may carry.
pub const MAX_OPTION_WEIGHT: u8 = 100;

/// A single multiple-choice question in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier; snapshots are ordered by it.
    pub id: String,
    /// Category label used for sub-scoring (e.g. "Password Management").
    pub category: String,
    /// The question as shown to the subject.
    #[serde(default)]
    pub text: String,
    /// Multiplier applied to the chosen option weight. Always positive.
    pub weight: u32,
    /// Audiences the question applies to. Empty means every audience.
    #[serde(default)]
    pub audiences: Vec<Audience>,
    /// Inactive questions stay in the catalog but are never snapshotted.
    #[serde(default = "default_true")]
    pub active: bool,
    /// The fixed, ordered answer options.
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Look up an option by its label.
    pub fn option(&self, label: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.label == label)
    }

    /// Whether this question is asked of the given audience.
    pub fn applies_to(&self, audience: Audience) -> bool {
        self.audiences.is_empty() || self.audiences.contains(&audience)
    }

    /// Maximum contribution this question can make to its category.
    pub fn max_contribution(&self) -> u64 {
        self.weight as u64 * MAX_OPTION_WEIGHT as u64
    }
}

/// A labelled answer option and its weight in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub label: String,
    pub weight: u8,
}

fn default_true() -> bool {
    true
}

/// Who an assessment is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Individual,
    Organization,
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Audience::Individual => write!(f, "individual"),
            Audience::Organization => write!(f, "organization"),
        }
    }
}

impl FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "individual" | "person" => Ok(Audience::Individual),
            "organization" | "organisation" | "org" | "business" => Ok(Audience::Organization),
            other => Err(format!("unknown audience: {other}")),
        }
    }
}

/// Lifecycle state of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    InProgress,
    Finalized,
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptState::InProgress => write!(f, "in-progress"),
            AttemptState::Finalized => write!(f, "finalized"),
        }
    }
}

/// One pass through a question snapshot by a subject.
///
/// Answers live on the attempt record so the store can check the state and
/// upsert in one step. `revision` grows with every recorded answer and lets
/// finalize detect answers that arrived after scoring started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub subject_id: String,
    /// 1-based, gap-free per subject.
    pub attempt_number: u32,
    pub audience: Audience,
    pub state: AttemptState,
    /// Catalog snapshot taken at start, ordered by question id.
    pub snapshot: Vec<Question>,
    /// question id → selected option label.
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub revision: u64,
    pub started_at: DateTime<Utc>,
    /// Present exactly when `state` is `Finalized`.
    #[serde(default)]
    pub result: Option<AttemptResult>,
}

impl Attempt {
    /// A fresh in-progress attempt.
    pub fn start(
        subject_id: &str,
        attempt_number: u32,
        audience: Audience,
        snapshot: Vec<Question>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id: subject_id.to_string(),
            attempt_number,
            audience,
            state: AttemptState::InProgress,
            snapshot,
            answers: BTreeMap::new(),
            revision: 0,
            started_at: Utc::now(),
            result: None,
        }
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.snapshot.iter().find(|q| q.id == question_id)
    }

    /// Snapshot questions that have no recorded answer yet, in snapshot order.
    pub fn missing_answers(&self) -> Vec<String> {
        self.snapshot
            .iter()
            .filter(|q| !self.answers.contains_key(&q.id))
            .map(|q| q.id.clone())
            .collect()
    }

    pub fn is_finalized(&self) -> bool {
        self.state == AttemptState::Finalized
    }

    /// Recorded answers as flat records, ordered by question id.
    pub fn answer_records(&self) -> Vec<AnswerRecord> {
        self.answers
            .iter()
            .map(|(question_id, label)| AnswerRecord {
                subject_id: self.subject_id.clone(),
                attempt_number: self.attempt_number,
                question_id: question_id.clone(),
                option_label: label.clone(),
            })
            .collect()
    }
}

/// A selected option for one question of one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub subject_id: String,
    pub attempt_number: u32,
    pub question_id: String,
    pub option_label: String,
}

/// Sub-score for a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Σ question weight × chosen option weight.
    pub total_scored: u64,
    /// Σ question weight × 100.
    pub total_weighted: u64,
    /// Full precision; rounding is the caller's business.
    pub percentage_score: f64,
    pub questions_answered: u32,
}

/// Output of the scoring function: category sub-scores plus the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Keyed by category label. Categories without weight are absent.
    pub categories: BTreeMap<String, CategoryScore>,
    pub overall_percentage: f64,
}

/// The immutable scored outcome of one finalized attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub attempt_id: Uuid,
    pub subject_id: String,
    pub attempt_number: u32,
    pub categories: BTreeMap<String, CategoryScore>,
    pub overall_percentage: f64,
    pub completed_at: DateTime<Utc>,
}

impl AttemptResult {
    pub fn new(attempt: &Attempt, card: ScoreCard, completed_at: DateTime<Utc>) -> Self {
        Self {
            attempt_id: attempt.id,
            subject_id: attempt.subject_id.clone(),
            attempt_number: attempt.attempt_number,
            categories: card.categories,
            overall_percentage: card.overall_percentage,
            completed_at,
        }
    }
}

/// Answering progress of an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptProgress {
    pub subject_id: String,
    pub attempt_number: u32,
    pub state: AttemptState,
    pub answered: usize,
    pub total: usize,
    pub missing: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, audiences: Vec<Audience>) -> Question {
        Question {
            id: id.into(),
            category: "Network".into(),
            text: String::new(),
            weight: 4,
            audiences,
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
        }
    }

    #[test]
    fn audience_display_and_parse() {
        assert_eq!(Audience::Individual.to_string(), "individual");
        assert_eq!(
            "Organization".parse::<Audience>().unwrap(),
            Audience::Organization
        );
        assert_eq!("org".parse::<Audience>().unwrap(), Audience::Organization);
        assert!("household".parse::<Audience>().is_err());
    }

    #[test]
    fn question_without_audiences_applies_to_everyone() {
        let q = question("q1", vec![]);
        assert!(q.applies_to(Audience::Individual));
        assert!(q.applies_to(Audience::Organization));

        let q = question("q2", vec![Audience::Organization]);
        assert!(!q.applies_to(Audience::Individual));
        assert_eq!(q.max_contribution(), 400);
    }

    #[test]
    fn missing_answers_follow_snapshot_order() {
        let mut attempt = Attempt::start(
            "alice",
            1,
            Audience::Individual,
            vec![question("a", vec![]), question("b", vec![]), question("c", vec![])],
        );
        attempt.answers.insert("b".into(), "Yes".into());

        assert_eq!(attempt.missing_answers(), vec!["a", "c"]);
        assert_eq!(attempt.answer_records().len(), 1);
        assert_eq!(attempt.state, AttemptState::InProgress);
    }

    #[test]
    fn attempt_serde_roundtrip() {
        let attempt = Attempt::start("alice", 3, Audience::Organization, vec![question("a", vec![])]);
        let json = serde_json::to_string(&attempt).unwrap();
        let back: Attempt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attempt);
    }
}
