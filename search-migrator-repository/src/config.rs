//! Configuration types for the OpenSearch client.

/// Default OpenSearch URL.
pub const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default name of the index documents are written to.
pub const DEFAULT_INDEX_NAME: &str = "authors";

/// Credentials sent with every request to the search engine.
#[derive(Clone, PartialEq, Eq)]
pub enum IndexAuth {
    /// Pre-encoded API key, sent as `Authorization: ApiKey <key>`.
    ApiKey(String),
    /// HTTP basic authentication.
    Basic { username: String, password: String },
}

impl std::fmt::Debug for IndexAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Connection settings for the search index.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Base URL of the search engine.
    pub url: String,
    /// Name of the index documents are written to.
    pub index: String,
    /// Optional credentials.
    pub auth: Option<IndexAuth>,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OPENSEARCH_URL.to_string(),
            index: DEFAULT_INDEX_NAME.to_string(),
            auth: None,
        }
    }
}

impl SearchIndexConfig {
    /// Create a config for the given URL and index without credentials.
    pub fn new(url: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            index: index.into(),
            auth: None,
        }
    }

    /// Attach credentials.
    pub fn with_auth(mut self, auth: IndexAuth) -> Self {
        self.auth = Some(auth);
        self
    }
}
