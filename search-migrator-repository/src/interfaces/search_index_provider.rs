//! Search index provider trait definition.
//!
//! This module defines the abstract interface for writing documents into the
//! search index, allowing for different backend implementations (OpenSearch,
//! Elasticsearch, in-memory mocks).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;

/// Abstracts the underlying search index implementation.
///
/// Implementations must be safe to share between concurrent indexing workers:
/// every call is an independent request and no client-side state is mutated
/// by callers.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Create or replace a document.
    ///
    /// The write must be visible to searches by the time this returns `Ok`.
    ///
    /// # Arguments
    ///
    /// * `document_id` - The document identifier within the index
    /// * `body` - The serialized document
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was written
    /// * `Err(SearchIndexError::Rejected)` - If the service refused this document
    /// * `Err(SearchIndexError)` - Any other failure, see [`SearchIndexError::is_fatal`]
    async fn upsert_document(&self, document_id: &str, body: Value)
        -> Result<(), SearchIndexError>;

    /// Check if the search engine is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine answered successfully
    /// * `Ok(false)` - If the search engine answered with an error status
    /// * `Err(SearchIndexError)` - If the request could not be sent
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
