//! The `readiness validate` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use readiness_core::catalog::{find_catalog_files, parse_catalog, validate_catalog, Catalog};
use readiness_core::model::Audience;
use readiness_store::load_config_from;

pub fn execute(catalog_path: Option<PathBuf>, config_path: Option<&Path>) -> Result<()> {
    let catalog_path = match catalog_path {
        Some(path) => path,
        None => load_config_from(config_path)?.catalog,
    };

    if !catalog_path.is_dir() {
        let catalog = parse_catalog(&catalog_path)?;
        return report(vec![catalog], 0);
    }

    let files = find_catalog_files(&catalog_path)?;
    anyhow::ensure!(
        !files.is_empty(),
        "no catalog files found in {}",
        catalog_path.display()
    );

    let mut catalogs = Vec::new();
    let mut errors = 0;
    for path in &files {
        match parse_catalog(path) {
            Ok(catalog) => catalogs.push(catalog),
            Err(e) => {
                println!("{}: ERROR: {e:#}", path.display());
                errors += 1;
            }
        }
    }

    report(catalogs, errors)
}

fn report(catalogs: Vec<Catalog>, errors: usize) -> Result<()> {
    let mut total_warnings = 0;

    for catalog in &catalogs {
        println!(
            "Catalog: {} ({} questions, {} individual, {} organization)",
            catalog.name,
            catalog.questions.len(),
            catalog.snapshot(Audience::Individual).len(),
            catalog.snapshot(Audience::Organization).len()
        );

        let warnings = validate_catalog(catalog);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if catalogs.len() > 1 {
        let merged = Catalog::merge(catalogs);
        for w in validate_catalog(&merged)
            .iter()
            .filter(|w| w.message.starts_with("duplicate question ID"))
        {
            println!("  WARNING (across files): {}", w.message);
            total_warnings += 1;
        }
    }

    if errors > 0 {
        anyhow::bail!("{errors} catalog file(s) failed to load, {total_warnings} warning(s)");
    }
    if total_warnings == 0 {
        println!("All catalogs valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
