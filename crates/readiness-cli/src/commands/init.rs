//! The `readiness init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create readiness.toml
    if std::path::Path::new("readiness.toml").exists() {
        println!("readiness.toml already exists, skipping.");
    } else {
        std::fs::write("readiness.toml", SAMPLE_CONFIG)?;
        println!("Created readiness.toml");
    }

    // Create example catalog
    std::fs::create_dir_all("catalog")?;
    let example_path = std::path::Path::new("catalog/security.toml");
    if example_path.exists() {
        println!("catalog/security.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_CATALOG)?;
        println!("Created catalog/security.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: readiness validate");
    println!("  2. Run: readiness start --subject <name>");
    println!("  3. Answer each question, then: readiness finalize --subject <name> --attempt 1");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# readiness configuration

catalog = "catalog"
default_audience = "individual"
max_attempts = 10
recommendation_cap = 5

[store]
type = "json"
path = ".readiness/store.json"

# Reference scores shown next to the history.
# [benchmarks]
# industry_average = 62.0
# peer_average = 58.0
# top_performer_average = 88.0
"#;

const EXAMPLE_CATALOG: &str = include_str!("../../../../catalogs/security.toml");
