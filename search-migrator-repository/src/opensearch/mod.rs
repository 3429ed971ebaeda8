//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch (or any Elasticsearch-compatible document API) as the
//! backend.

mod client;

pub use client::OpenSearchClient;
