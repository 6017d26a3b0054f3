//! The `readiness finalize` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};

use readiness_core::model::AttemptResult;

use super::{pct, Session};

pub async fn execute(
    subject: String,
    attempt: u32,
    format: String,
    config_path: Option<&Path>,
) -> Result<()> {
    let session = Session::open(config_path)?;
    let result = session.service.finalize(&subject, attempt).await?;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            println!(
                "Attempt {} of {subject} finalized: {} overall",
                result.attempt_number,
                pct(result.overall_percentage)
            );
            println!("{}", category_table(&result));
        }
    }

    Ok(())
}

pub fn category_table(result: &AttemptResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Score", "Answered", "Points"]);
    for (category, score) in &result.categories {
        table.add_row(vec![
            Cell::new(category),
            Cell::new(pct(score.percentage_score)),
            Cell::new(score.questions_answered),
            Cell::new(format!("{}/{}", score.total_scored, score.total_weighted)),
        ]);
    }
    table
}
