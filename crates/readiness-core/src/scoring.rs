//! Weighted category and overall scoring.
//!
//! Each question contributes `weight × chosen option weight` to its category
//! out of a maximum of `weight × 100`. Category percentages and the overall
//! percentage are ratios of those sums, kept at full `f64` precision.

use std::collections::BTreeMap;

use crate::error::AssessmentError;
use crate::model::{CategoryScore, Question, ScoreCard, MAX_OPTION_WEIGHT};

/// Score a complete answer set against a question snapshot.
///
/// `answers` maps question id → selected option label. Answers outside the
/// snapshot, labels a question does not offer, and unanswered questions are
/// all rejected, as is a chosen option weighted above 100. Categories whose total weight is zero are left out of both
/// the per-category output and the overall denominator.
pub fn score(
    snapshot: &[Question],
    answers: &BTreeMap<String, String>,
) -> Result<ScoreCard, AssessmentError> {
    for question_id in answers.keys() {
        if !snapshot.iter().any(|q| &q.id == question_id) {
            return Err(AssessmentError::UnknownQuestion {
                question_id: question_id.clone(),
            });
        }
    }

    let missing: Vec<String> = snapshot
        .iter()
        .filter(|q| !answers.contains_key(&q.id))
        .map(|q| q.id.clone())
        .collect();
    if !missing.is_empty() {
        return Err(AssessmentError::IncompleteAssessment { missing });
    }

    let mut totals: BTreeMap<String, CategoryScore> = BTreeMap::new();
    for question in snapshot {
        let label = &answers[&question.id];
        let option = question
            .option(label)
            .ok_or_else(|| AssessmentError::InvalidOptionLabel {
                question_id: question.id.clone(),
                label: label.clone(),
            })?;
        if option.weight > MAX_OPTION_WEIGHT {
            return Err(AssessmentError::InvalidOptionWeight {
                question_id: question.id.clone(),
                label: option.label.clone(),
                weight: option.weight,
            });
        }

        let entry = totals
            .entry(question.category.clone())
            .or_insert(CategoryScore {
                total_scored: 0,
                total_weighted: 0,
                percentage_score: 0.0,
                questions_answered: 0,
            });
        entry.total_scored += question.weight as u64 * option.weight as u64;
        entry.total_weighted += question.max_contribution();
        entry.questions_answered += 1;
    }

    totals.retain(|category, totals| {
        if totals.total_weighted == 0 {
            tracing::debug!("category '{category}' has no weight, excluded from scoring");
            false
        } else {
            true
        }
    });

    let mut scored_sum = 0u64;
    let mut weighted_sum = 0u64;
    for category in totals.values_mut() {
        category.percentage_score = percentage(category.total_scored, category.total_weighted);
        scored_sum += category.total_scored;
        weighted_sum += category.total_weighted;
    }

    Ok(ScoreCard {
        categories: totals,
        overall_percentage: percentage(scored_sum, weighted_sum),
    })
}

fn percentage(scored: u64, weighted: u64) -> f64 {
    if weighted == 0 {
        return 0.0;
    }
    scored as f64 / weighted as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerOption;

    fn question(id: &str, category: &str, weight: u32) -> Question {
        Question {
            id: id.into(),
            category: category.into(),
            text: String::new(),
            weight,
            audiences: vec![],
            active: true,
            options: vec![
                AnswerOption {
                    label: "Always".into(),
                    weight: 100,
                },
                AnswerOption {
                    label: "Mostly".into(),
                    weight: 70,
                },
                AnswerOption {
                    label: "Rarely".into(),
                    weight: 30,
                },
                AnswerOption {
                    label: "Never".into(),
                    weight: 0,
                },
            ],
        }
    }

    fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(q, a)| (q.to_string(), a.to_string()))
            .collect()
    }

    #[test]
    fn password_management_worked_example() {
        let snapshot = vec![
            question("q1", "Password Management", 10),
            question("q2", "Password Management", 8),
        ];
        let card = score(&snapshot, &answers(&[("q1", "Always"), ("q2", "Mostly")])).unwrap();

        let pm = &card.categories["Password Management"];
        assert_eq!(pm.total_scored, 1560);
        assert_eq!(pm.total_weighted, 1800);
        assert_eq!(pm.questions_answered, 2);
        assert!((pm.percentage_score - 86.666_666_666_666_67).abs() < 1e-9);
        assert!((card.overall_percentage - pm.percentage_score).abs() < f64::EPSILON);
    }

    #[test]
    fn overall_is_weighted_across_categories() {
        let snapshot = vec![
            question("a", "Email", 10),
            question("b", "Network", 30),
        ];
        let card = score(&snapshot, &answers(&[("a", "Always"), ("b", "Never")])).unwrap();

        assert_eq!(card.categories["Email"].percentage_score, 100.0);
        assert_eq!(card.categories["Network"].percentage_score, 0.0);
        // 1000 / 4000, not the 50% a plain mean of categories would give.
        assert!((card.overall_percentage - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_weighted_matches_snapshot_maximum() {
        let snapshot = vec![
            question("a", "Email", 3),
            question("b", "Email", 7),
            question("c", "Backups", 11),
            question("d", "Devices", 1),
        ];
        let card = score(
            &snapshot,
            &answers(&[("a", "Rarely"), ("b", "Never"), ("c", "Mostly"), ("d", "Always")]),
        )
        .unwrap();

        let weighted: u64 = card.categories.values().map(|c| c.total_weighted).sum();
        let expected: u64 = snapshot.iter().map(|q| q.weight as u64 * 100).sum();
        assert_eq!(weighted, expected);
        assert!((0.0..=100.0).contains(&card.overall_percentage));
    }

    #[test]
    fn overall_stays_within_bounds_at_the_extremes() {
        let snapshot = vec![question("a", "Email", 4), question("b", "Backups", 9)];

        let best = score(&snapshot, &answers(&[("a", "Always"), ("b", "Always")])).unwrap();
        assert_eq!(best.overall_percentage, 100.0);

        let worst = score(&snapshot, &answers(&[("a", "Never"), ("b", "Never")])).unwrap();
        assert_eq!(worst.overall_percentage, 0.0);
    }

    #[test]
    fn zero_weight_category_is_excluded() {
        let snapshot = vec![question("a", "Email", 5), question("z", "Legacy", 0)];
        let card = score(&snapshot, &answers(&[("a", "Mostly"), ("z", "Always")])).unwrap();

        assert!(!card.categories.contains_key("Legacy"));
        assert!((card.overall_percentage - 70.0).abs() < 1e-9);
    }

    #[test]
    fn incomplete_answers_are_rejected() {
        let snapshot: Vec<_> = (1..=5)
            .map(|i| question(&format!("q{i}"), "Email", 2))
            .collect();
        let partial = answers(&[("q1", "Always"), ("q2", "Always"), ("q3", "Always"), ("q5", "Never")]);

        let err = score(&snapshot, &partial).unwrap_err();
        assert_eq!(
            err,
            AssessmentError::IncompleteAssessment {
                missing: vec!["q4".into()]
            }
        );
    }

    #[test]
    fn foreign_question_is_rejected() {
        let snapshot = vec![question("a", "Email", 5)];
        let err = score(&snapshot, &answers(&[("a", "Always"), ("x", "Always")])).unwrap_err();
        assert_eq!(
            err,
            AssessmentError::UnknownQuestion {
                question_id: "x".into()
            }
        );
    }

    #[test]
    fn unknown_label_is_rejected() {
        let snapshot = vec![question("a", "Email", 5)];
        let err = score(&snapshot, &answers(&[("a", "Sometimes")])).unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::InvalidOptionLabel { ref question_id, ref label }
                if question_id == "a" && label == "Sometimes"
        ));
    }

    #[test]
    fn option_weight_above_100_is_rejected() {
        let mut q = question("a", "Email", 5);
        q.options[0].weight = 150;
        let snapshot = vec![q, question("b", "Email", 5)];

        let err = score(&snapshot, &answers(&[("a", "Always"), ("b", "Always")])).unwrap_err();
        assert_eq!(
            err,
            AssessmentError::InvalidOptionWeight {
                question_id: "a".into(),
                label: "Always".into(),
                weight: 150
            }
        );

        // Only the chosen option matters.
        let card = score(&snapshot, &answers(&[("a", "Never"), ("b", "Always")])).unwrap();
        assert_eq!(card.overall_percentage, 50.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let snapshot = vec![question("a", "Email", 5), question("b", "Backups", 3)];
        let set = answers(&[("a", "Rarely"), ("b", "Mostly")]);
        assert_eq!(score(&snapshot, &set).unwrap(), score(&snapshot, &set).unwrap());
    }
}
