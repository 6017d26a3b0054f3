//! The `readiness compare` command.

use std::path::Path;

use anyhow::Result;

use super::{pct, signed_pct, Session};

pub async fn execute(
    subject: String,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
    config_path: Option<&Path>,
) -> Result<()> {
    let session = Session::open(config_path)?;
    let Some(report) = session.service.compare_latest(&subject, threshold).await? else {
        println!("{subject} needs at least two finalized attempts to compare.");
        return Ok(());
    };

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Attempt {} vs {}: overall {}, {} regressions, {} improvements, {} unchanged",
                report.current_attempt,
                report.baseline_attempt,
                signed_pct(report.overall_delta),
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &report.regressions {
                    println!(
                        "  {} {} -> {} ({})",
                        r.category,
                        pct(r.baseline_percentage),
                        pct(r.current_percentage),
                        signed_pct(r.delta)
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} {} -> {} ({})",
                        i.category,
                        pct(i.baseline_percentage),
                        pct(i.current_percentage),
                        signed_pct(i.delta)
                    );
                }
            }

            if !report.new_categories.is_empty() {
                println!("\nNew categories: {}", report.new_categories.join(", "));
            }
            if !report.removed_categories.is_empty() {
                println!("Removed categories: {}", report.removed_categories.join(", "));
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
