//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::headers::{HeaderValue, AUTHORIZATION},
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    params::Refresh,
    IndexParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{IndexAuth, SearchIndexConfig};
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;

/// OpenSearch client implementation.
///
/// Writes each document with a single index request and `refresh=true`, so a
/// successful return means the document is already searchable.
///
/// # Example
///
/// ```ignore
/// let config = SearchIndexConfig::new("http://localhost:9200", "authors");
/// let client = OpenSearchClient::new(&config)?;
///
/// client.upsert_document("1", json!({ "name": "Ursula" })).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    index: String,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the configured URL and index.
    ///
    /// No request is sent; use [`SearchIndexProvider::health_check`] to verify
    /// the server is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError::ConnectionError)` - If the URL or credentials are malformed
    pub fn new(config: &SearchIndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();

        match &config.auth {
            Some(IndexAuth::Basic { username, password }) => {
                builder = builder.auth(Credentials::Basic(username.clone(), password.clone()));
            }
            Some(IndexAuth::ApiKey(key)) => {
                let value = HeaderValue::from_str(&format!("ApiKey {}", key))
                    .map_err(|e| SearchIndexError::connection(format!("Invalid API key: {}", e)))?;
                builder = builder.header(AUTHORIZATION, value);
            }
            None => {}
        }

        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        info!(
            url = %config.url,
            index = %config.index,
            authenticated = config.auth.is_some(),
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            index: config.index.clone(),
        })
    }

    /// Name of the index this client writes to.
    pub fn index(&self) -> &str {
        &self.index
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    /// Index a document under `document_id`, replacing any existing version.
    ///
    /// API reference: https://docs.opensearch.org/latest/api-reference/document-apis/index-document/
    #[instrument(skip(self, body))]
    async fn upsert_document(
        &self,
        document_id: &str,
        body: Value,
    ) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .index(IndexParts::IndexId(&self.index, document_id))
            .refresh(Refresh::True)
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::transport(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchIndexError::from_status(status.as_u16(), error_body));
        }

        debug!(document_id = %document_id, "Document indexed");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        Ok(response.status_code().is_success())
    }
}
