use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use readiness_core::model::{AnswerOption, AttemptResult, CategoryScore, Question};
use readiness_core::report::ReportAggregator;
use readiness_core::scoring::score;
use uuid::Uuid;

const LABELS: [(&str, u8); 4] = [("Always", 100), ("Mostly", 70), ("Rarely", 30), ("Never", 0)];

fn make_snapshot(n: usize, categories: usize) -> (Vec<Question>, BTreeMap<String, String>) {
    let mut snapshot = Vec::with_capacity(n);
    let mut answers = BTreeMap::new();
    for i in 0..n {
        let id = format!("q{i:04}");
        snapshot.push(Question {
            id: id.clone(),
            category: format!("Category {}", i % categories),
            text: String::new(),
            weight: (i % 10 + 1) as u32,
            audiences: vec![],
            active: true,
            options: LABELS
                .iter()
                .map(|(label, weight)| AnswerOption {
                    label: label.to_string(),
                    weight: *weight,
                })
                .collect(),
        });
        answers.insert(id, LABELS[i % LABELS.len()].0.to_string());
    }
    (snapshot, answers)
}

fn make_result(attempt_number: u32, categories: usize) -> AttemptResult {
    AttemptResult {
        attempt_id: Uuid::nil(),
        subject_id: "bench".into(),
        attempt_number,
        categories: (0..categories)
            .map(|i| {
                (
                    format!("Category {i}"),
                    CategoryScore {
                        total_scored: (i as u64 * 37) % 1000,
                        total_weighted: 1000,
                        percentage_score: ((i as u64 * 37) % 1000) as f64 / 10.0,
                        questions_answered: 10,
                    },
                )
            })
            .collect(),
        overall_percentage: 50.0,
        completed_at: chrono::Utc::now(),
    }
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    for (n, categories) in [(20, 5), (200, 12), (2000, 40)] {
        let (snapshot, answers) = make_snapshot(n, categories);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| score(black_box(&snapshot), black_box(&answers)))
        });
    }

    group.finish();
}

fn bench_reports(c: &mut Criterion) {
    let mut group = c.benchmark_group("reports");
    let aggregator = ReportAggregator::default();

    let latest = make_result(2, 40);
    group.bench_function("recommendations_40_categories", |b| {
        b.iter(|| aggregator.recommendations(black_box(&latest)))
    });

    let history: Vec<_> = (1..=10).map(|n| make_result(n, 12)).collect();
    group.bench_function("trend_10_attempts", |b| {
        b.iter(|| aggregator.trend(black_box(&history)))
    });

    let baseline = make_result(1, 40);
    group.bench_function("compare_40_categories", |b| {
        b.iter(|| aggregator.compare(black_box(&baseline), black_box(&latest), 1.0))
    });

    group.finish();
}

criterion_group!(benches, bench_score, bench_reports);
criterion_main!(benches);
