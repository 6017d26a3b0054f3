//! The `readiness history` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde_json::json;

use super::{pct, signed_pct, Session};

pub async fn execute(subject: String, format: String, config_path: Option<&Path>) -> Result<()> {
    let session = Session::open(config_path)?;
    let service = &session.service;

    let history = service.history(&subject).await?;
    let trend = service.trend(&subject).await?;
    let summary = service.summary(&subject).await?;
    let benchmarks = match &session.config.benchmarks {
        Some(benchmarks) => service.benchmark_comparison(&subject, benchmarks).await?,
        None => None,
    };

    match format.as_str() {
        "json" => {
            let doc = json!({
                "subject_id": subject,
                "results": history,
                "trend": trend,
                "summary": summary,
                "benchmarks": benchmarks,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        _ => {
            if trend.is_empty() {
                println!("No finalized attempts for {subject} yet.");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec!["Attempt", "Overall", "Change", "Completed"]);
            for point in &trend {
                table.add_row(vec![
                    Cell::new(point.attempt_number),
                    Cell::new(pct(point.overall_percentage)),
                    Cell::new(
                        point
                            .accuracy_change
                            .map(signed_pct)
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::new(point.completed_at.format("%Y-%m-%d %H:%M UTC")),
                ]);
            }
            println!("{table}");

            if let Some(summary) = summary {
                println!(
                    "{} attempt(s): latest {}, best {}, mean {}, net {}",
                    summary.attempts,
                    pct(summary.latest),
                    pct(summary.best),
                    pct(summary.mean),
                    signed_pct(summary.net_change)
                );
            }

            if let Some(b) = benchmarks {
                println!(
                    "Against benchmarks: industry {}, peers {}, top performers {}",
                    signed_pct(b.industry_gap),
                    signed_pct(b.peer_gap),
                    signed_pct(b.top_performer_gap)
                );
            }
        }
    }

    Ok(())
}
