use criterion::{black_box, criterion_group, criterion_main, Criterion};

use readiness_core::catalog::{parse_catalog_str, validate_catalog};
use readiness_core::model::Audience;

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    // Catalog TOML strings of various sizes
    let small_toml = generate_catalog_toml(10);
    let medium_toml = generate_catalog_toml(100);
    let large_toml = generate_catalog_toml(500);

    group.bench_function("10_questions", |b| {
        b.iter(|| parse_catalog_str(black_box(&small_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("100_questions", |b| {
        b.iter(|| parse_catalog_str(black_box(&medium_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("500_questions", |b| {
        b.iter(|| parse_catalog_str(black_box(&large_toml), black_box("bench.toml".as_ref())))
    });

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");
    let catalog = parse_catalog_str(&generate_catalog_toml(500), "bench.toml".as_ref())
        .expect("bench catalog parses");

    group.bench_function("snapshot_500", |b| {
        b.iter(|| catalog.snapshot(black_box(Audience::Organization)))
    });

    group.bench_function("validate_500", |b| {
        b.iter(|| validate_catalog(black_box(&catalog)))
    });

    group.finish();
}

fn generate_catalog_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[catalog]
id = "bench"
name = "Benchmark"
"#,
    );
    for i in 0..n {
        let audiences = if i % 3 == 0 {
            r#"["organization"]"#
        } else {
            r#"["individual", "organization"]"#
        };
        s.push_str(&format!(
            r#"
[[questions]]
id = "q{i:04}"
category = "Category {}"
text = "Question {i}?"
weight = {}
audiences = {audiences}

[[questions.options]]
label = "Always"
weight = 100

[[questions.options]]
label = "Sometimes"
weight = 50

[[questions.options]]
label = "Never"
weight = 0
"#,
            i % 8,
            i % 10 + 1
        ));
    }
    s
}

criterion_group!(benches, bench_toml_parsing, bench_snapshot);
criterion_main!(benches);
