//! readiness-store: Attempt stores and configuration.
//!
//! Implements `AssessmentStore` in memory and as a JSON file, and loads the
//! `readiness.toml` configuration that chooses between them.

pub mod config;
pub mod file;
pub mod ledger;
pub mod memory;

pub use config::{load_config, load_config_from, open_store, ReadinessConfig, StoreConfig};
pub use file::{JsonFileStore, RetryPolicy};
pub use memory::MemoryStore;
