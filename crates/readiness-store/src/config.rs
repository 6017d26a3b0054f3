//! Readiness configuration and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use readiness_core::model::Audience;
use readiness_core::report::{Benchmarks, DEFAULT_RECOMMENDATION_CAP};
use readiness_core::traits::AssessmentStore;
use readiness_core::tracker::DEFAULT_MAX_ATTEMPTS;
use readiness_core::ServiceConfig;

use crate::file::{JsonFileStore, RetryPolicy};
use crate::memory::MemoryStore;

/// Which store backend to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory,
    Json {
        #[serde(default = "default_store_path")]
        path: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Json {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".readiness/store.json")
}

/// Top-level readiness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessConfig {
    /// Catalog file or directory of catalog files.
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,
    /// Audience used when a command does not name one.
    #[serde(default = "default_audience")]
    pub default_audience: Audience,
    /// Attempts allowed per subject.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Maximum recommendations shown.
    #[serde(default = "default_recommendation_cap")]
    pub recommendation_cap: usize,
    #[serde(default)]
    pub store: StoreConfig,
    /// Retries on store I/O errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Reference scores for benchmark comparison.
    #[serde(default)]
    pub benchmarks: Option<Benchmarks>,
}

fn default_catalog() -> PathBuf {
    PathBuf::from("catalog")
}
fn default_audience() -> Audience {
    Audience::Individual
}
fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_recommendation_cap() -> usize {
    DEFAULT_RECOMMENDATION_CAP
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    50
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            default_audience: default_audience(),
            max_attempts: default_max_attempts(),
            recommendation_cap: default_recommendation_cap(),
            store: StoreConfig::default(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            benchmarks: None,
        }
    }
}

impl ReadinessConfig {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            max_attempts: self.max_attempts,
            recommendation_cap: self.recommendation_cap,
            default_audience: self.default_audience,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Anchor relative paths at `base`.
    fn rebase(&mut self, base: &Path) {
        if self.catalog.is_relative() {
            self.catalog = base.join(&self.catalog);
        }
        if let StoreConfig::Json { path } = &mut self.store {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `readiness.toml` in the current directory
/// 2. `~/.config/readiness/config.toml`
///
/// Environment variable overrides: `READINESS_CATALOG`, `READINESS_STORE_PATH`.
pub fn load_config() -> Result<ReadinessConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
///
/// Relative paths inside a config file are taken relative to that file.
pub fn load_config_from(path: Option<&Path>) -> Result<ReadinessConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("readiness.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ReadinessConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ReadinessConfig::default(),
    };

    config.catalog = resolve_path(&config.catalog);
    if let StoreConfig::Json { path } = &mut config.store {
        *path = resolve_path(path);
    }
    if let Some(base) = config_path.as_deref().and_then(Path::parent) {
        if !base.as_os_str().is_empty() {
            config.rebase(base);
        }
    }

    // Apply env var overrides
    if let Ok(catalog) = std::env::var("READINESS_CATALOG") {
        config.catalog = PathBuf::from(catalog);
    }
    if let Ok(store_path) = std::env::var("READINESS_STORE_PATH") {
        config.store = StoreConfig::Json {
            path: PathBuf::from(store_path),
        };
    }

    if config.max_attempts == 0 {
        anyhow::bail!("max_attempts must be at least 1");
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("readiness"))
}

/// Create the configured store.
pub fn open_store(config: &ReadinessConfig) -> Arc<dyn AssessmentStore> {
    match &config.store {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::Json { path } => {
            tracing::debug!("using json store at {}", path.display());
            Arc::new(JsonFileStore::open(path, config.retry_policy()))
        }
    }
}
