//! # Search Migrator
//!
//! Main library for the author search migrator.
//!
//! This crate provides the configuration and dependency wiring for running
//! the migration pipeline as a process.

pub mod config;

pub use config::{Dependencies, Settings};

use thiserror::Error;

/// Errors that can occur during migrator initialization or execution.
#[derive(Error, Debug)]
pub enum MigratorError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] search_migrator_pipeline::PipelineError),

    /// Search index error.
    #[error("Search error: {0}")]
    SearchError(#[from] search_migrator_repository::SearchIndexError),
}

impl MigratorError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
