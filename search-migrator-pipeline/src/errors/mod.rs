//! Error types for the search migrator pipeline.

use search_migrator_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur in the search migrator pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The source database or the search service could not be reached,
    /// or refused the credentials.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The source query was rejected.
    #[error("Query error: {0}")]
    QueryError(String),

    /// A source row could not be mapped onto a record.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// A record could not be serialized into a document.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The search service rejected a document.
    #[error("Index rejection: {0}")]
    IndexRejection(String),

    /// The search service became unreachable during the run.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The pipeline configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An indexing worker task failed outside of its own error handling.
    #[error("Worker error: {0}")]
    WorkerError(String),

    /// The run was cancelled from outside the pipeline.
    #[error("Run cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a worker error.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::WorkerError(msg.into())
    }

    /// Stable name of the error category, used in run summaries.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConnectionError(_) => "ConnectionError",
            Self::QueryError(_) => "QueryError",
            Self::DecodeError(_) => "DecodeError",
            Self::SerializationError(_) => "SerializationError",
            Self::IndexRejection(_) => "IndexRejection",
            Self::TransportError(_) => "TransportError",
            Self::ConfigError(_) => "ConfigError",
            Self::WorkerError(_) => "WorkerError",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Returns true if the error halts the whole run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::SerializationError(_) | Self::IndexRejection(_))
    }
}

impl From<SearchIndexError> for PipelineError {
    fn from(err: SearchIndexError) -> Self {
        match err {
            SearchIndexError::ConnectionError(msg) => Self::ConnectionError(msg),
            SearchIndexError::TransportError(msg) => Self::TransportError(msg),
            err @ SearchIndexError::Unavailable { .. } => Self::ConnectionError(err.to_string()),
            SearchIndexError::Rejected { status, reason } => {
                Self::IndexRejection(format!("status {}: {}", status, reason))
            }
            SearchIndexError::SerializationError(msg) => Self::SerializationError(msg),
        }
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                // SQLSTATE class 28: invalid authorization specification
                let auth_failure = db_err
                    .code()
                    .map(|code| code.starts_with("28"))
                    .unwrap_or(false);
                if auth_failure {
                    Self::ConnectionError(db_err.to_string())
                } else {
                    Self::QueryError(db_err.to_string())
                }
            }
            err @ (sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed) => Self::ConnectionError(err.to_string()),
            err @ (sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::Decode(_)) => Self::DecodeError(err.to_string()),
            other => Self::QueryError(other.to_string()),
        }
    }
}
