//! readiness-core: Question catalogs, attempt lifecycle, scoring, and reports.
//!
//! This crate defines the data model, the storage and catalog traits, and the
//! scoring and reporting logic the rest of the readiness system builds on.

pub mod catalog;
pub mod error;
pub mod model;
pub mod recorder;
pub mod report;
pub mod scoring;
pub mod service;
pub mod tracker;
pub mod traits;

pub use error::{AssessmentError, StoreError};
pub use service::{AssessmentService, ServiceConfig};
