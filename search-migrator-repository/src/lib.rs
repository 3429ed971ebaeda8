//! # Search Migrator Repository
//!
//! This crate provides the trait and implementation for writing documents to
//! the search engine. It includes definitions for errors, the provider
//! interface, and a concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use config::{IndexAuth, SearchIndexConfig};
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::OpenSearchClient;
