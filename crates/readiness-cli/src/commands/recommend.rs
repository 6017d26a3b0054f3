//! The `readiness recommend` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{pct, Session};

pub async fn execute(subject: String, format: String, config_path: Option<&Path>) -> Result<()> {
    let session = Session::open(config_path)?;
    let recommendations = session.service.recommendations(&subject).await?;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
        _ => {
            if recommendations.is_empty() {
                println!("No finalized attempts for {subject} yet.");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec!["Priority", "Category", "Score"]);
            for rec in &recommendations {
                table.add_row(vec![
                    Cell::new(rec.priority),
                    Cell::new(&rec.category),
                    Cell::new(pct(rec.percentage)),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
