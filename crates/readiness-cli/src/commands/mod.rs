pub mod answer;
pub mod compare;
pub mod finalize;
pub mod history;
pub mod init;
pub mod questions;
pub mod recommend;
pub mod start;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use readiness_core::catalog::{load_catalog, Catalog};
use readiness_core::AssessmentService;
use readiness_store::{load_config_from, open_store, ReadinessConfig};

/// Loaded configuration and the service built from it.
pub struct Session {
    pub config: ReadinessConfig,
    pub service: AssessmentService,
}

impl Session {
    /// Open the store without reading the catalog. Answering, finalizing and
    /// reporting only use the snapshots stored with each attempt.
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let unloaded = Catalog::new("unloaded", "Catalog not loaded", Vec::new());
        Ok(Self::build(config, unloaded))
    }

    /// Open the store and load the configured catalog, for starting attempts.
    pub fn open_with_catalog(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let catalog = load_configured_catalog(&config)?;
        tracing::debug!(
            "catalog '{}' loaded with {} questions",
            catalog.id,
            catalog.questions.len()
        );
        Ok(Self::build(config, catalog))
    }

    fn build(config: ReadinessConfig, catalog: Catalog) -> Self {
        let store = open_store(&config);
        let service =
            AssessmentService::new(store, Arc::new(catalog), config.service_config());
        Self { config, service }
    }
}

pub fn load_configured_catalog(config: &ReadinessConfig) -> Result<Catalog> {
    load_catalog(&config.catalog)
        .with_context(|| format!("failed to load catalog from {}", config.catalog.display()))
}

/// Percentages are rounded only for display.
pub fn pct(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn signed_pct(value: f64) -> String {
    format!("{value:+.1}%")
}
