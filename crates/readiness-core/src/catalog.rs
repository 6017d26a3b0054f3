//! TOML question catalog.
//!
//! Loads question catalogs from TOML files and directories, validates them,
//! and serves audience-filtered snapshots through [`QuestionCatalog`].

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AssessmentError;
use crate::model::{AnswerOption, Audience, Question, MAX_OPTION_WEIGHT};
use crate::traits::QuestionCatalog;

/// Intermediate TOML structure for parsing catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    catalog: TomlCatalogHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlCatalogHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    category: String,
    #[serde(default)]
    text: String,
    weight: u32,
    #[serde(default)]
    audiences: Vec<String>,
    #[serde(default = "default_true")]
    active: bool,
    #[serde(default)]
    options: Vec<TomlOption>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    label: String,
    weight: u32,
}

fn default_true() -> bool {
    true
}

/// A loaded question catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Questions in file order, including inactive ones.
    pub questions: Vec<Question>,
}

impl Catalog {
    pub fn new(id: &str, name: &str, questions: Vec<Question>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            questions,
        }
    }

    /// Merge several catalogs into one, keeping question order per catalog.
    pub fn merge(catalogs: Vec<Catalog>) -> Self {
        let mut merged = Catalog {
            id: catalogs
                .iter()
                .map(|c| c.id.as_str())
                .collect::<Vec<_>>()
                .join("+"),
            name: catalogs
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            description: String::new(),
            questions: Vec::new(),
        };
        for catalog in catalogs {
            merged.questions.extend(catalog.questions);
        }
        merged
    }

    /// Active questions for the audience ordered by id, first occurrence wins.
    pub fn snapshot(&self, audience: Audience) -> Vec<Question> {
        let mut selected: Vec<Question> = self
            .questions
            .iter()
            .filter(|q| q.active && q.applies_to(audience))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.id.cmp(&b.id));
        selected.dedup_by(|later, earlier| {
            if later.id == earlier.id {
                tracing::warn!("duplicate question id '{}' ignored in snapshot", later.id);
                true
            } else {
                false
            }
        });
        selected
    }

    /// Distinct category labels of active questions.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.questions
            .iter()
            .filter(|q| q.active)
            .map(|q| q.category.as_str())
            .collect()
    }
}

#[async_trait]
impl QuestionCatalog for Catalog {
    async fn active_questions(&self, audience: Audience) -> Result<Vec<Question>, AssessmentError> {
        let snapshot = self.snapshot(audience);
        if snapshot.is_empty() {
            return Err(AssessmentError::NoQuestionsAvailable { audience });
        }
        Ok(snapshot)
    }
}

/// Parse a single TOML file into a `Catalog`.
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse a TOML string into a `Catalog` (useful for testing).
///
/// Rejects questions that would break scoring: zero weight, no options, or
/// an option weight above 100.
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            anyhow::ensure!(q.weight > 0, "question {} has weight 0", q.id);
            anyhow::ensure!(!q.options.is_empty(), "question {} has no options", q.id);

            let audiences = q
                .audiences
                .iter()
                .map(|a| a.parse().map_err(|e: String| anyhow::anyhow!("{}", e)))
                .collect::<Result<Vec<Audience>>>()?;

            let options = q
                .options
                .into_iter()
                .map(|o| {
                    anyhow::ensure!(
                        o.weight <= MAX_OPTION_WEIGHT as u32,
                        "option '{}' of question {} has weight {} (max {})",
                        o.label,
                        q.id,
                        o.weight,
                        MAX_OPTION_WEIGHT
                    );
                    Ok(AnswerOption {
                        label: o.label,
                        weight: o.weight as u8,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(Question {
                id: q.id,
                category: q.category,
                text: q.text,
                weight: q.weight,
                audiences,
                active: q.active,
                options,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Catalog {
        id: parsed.catalog.id,
        name: parsed.catalog.name,
        description: parsed.catalog.description,
        questions,
    })
}

/// Recursively list the `.toml` files under a directory, in path order.
pub fn find_catalog_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            files.extend(find_catalog_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }

    Ok(files)
}

/// Recursively load all `.toml` catalog files from a directory.
///
/// Files that fail to parse are skipped with a warning; `readiness validate`
/// reports them as errors.
pub fn load_catalog_directory(dir: &Path) -> Result<Vec<Catalog>> {
    let mut catalogs = Vec::new();
    for path in find_catalog_files(dir)? {
        match parse_catalog(&path) {
            Ok(catalog) => catalogs.push(catalog),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }
    Ok(catalogs)
}

/// Load a catalog from a file, or merge every catalog found in a directory.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if path.is_dir() {
        let catalogs = load_catalog_directory(path)?;
        anyhow::ensure!(
            !catalogs.is_empty(),
            "no catalog files found in {}",
            path.display()
        );
        Ok(Catalog::merge(catalogs))
    } else {
        parse_catalog(path)
    }
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a catalog for common authoring issues.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for q in &catalog.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("duplicate question ID: {}", q.id),
            });
        }
    }

    for q in &catalog.questions {
        let mut labels = HashSet::new();
        for option in &q.options {
            if !labels.insert(option.label.as_str()) {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id.clone()),
                    message: format!("duplicate option label: {}", option.label),
                });
            }
        }

        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "question text is empty".into(),
            });
        }

        if !q.active {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "question is inactive and will not be asked".into(),
            });
        }
    }

    // A category that exists for one audience but not another is usually an
    // authoring slip, so report where it is missing.
    let mut coverage: BTreeMap<&str, BTreeSet<Audience>> = BTreeMap::new();
    for q in catalog.questions.iter().filter(|q| q.active) {
        let entry = coverage.entry(q.category.as_str()).or_default();
        if q.audiences.is_empty() {
            entry.extend([Audience::Individual, Audience::Organization]);
        } else {
            entry.extend(q.audiences.iter().copied());
        }
    }
    for (category, audiences) in &coverage {
        for audience in [Audience::Individual, Audience::Organization] {
            if !audiences.contains(&audience) {
                warnings.push(ValidationWarning {
                    question_id: None,
                    message: format!("category '{category}' has no active questions for {audience}"),
                });
            }
        }
    }

    for audience in [Audience::Individual, Audience::Organization] {
        if catalog.snapshot(audience).is_empty() {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("no active questions for {audience}"),
            });
        }
    }

    warnings
}
