//! The `readiness questions` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};

use readiness_core::model::Audience;
use readiness_store::load_config_from;

use super::load_configured_catalog;

pub fn execute(audience: Option<Audience>, format: String, config_path: Option<&Path>) -> Result<()> {
    let config = load_config_from(config_path)?;
    let catalog = load_configured_catalog(&config)?;
    let audience = audience.unwrap_or(config.default_audience);
    let questions = catalog.snapshot(audience);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&questions)?);
        }
        _ => {
            let mut table = Table::new();
            table.set_header(vec!["ID", "Category", "Weight", "Question", "Options"]);
            for q in &questions {
                let options = q
                    .options
                    .iter()
                    .map(|o| o.label.as_str())
                    .collect::<Vec<_>>()
                    .join(" / ");
                table.add_row(vec![
                    Cell::new(&q.id),
                    Cell::new(&q.category),
                    Cell::new(q.weight),
                    Cell::new(&q.text),
                    Cell::new(options),
                ]);
            }
            println!("{table}");
            println!("{} questions for {audience}", questions.len());
        }
    }

    Ok(())
}
