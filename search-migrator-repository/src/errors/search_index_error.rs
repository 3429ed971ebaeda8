//! Search index error types.
//!
//! This module defines the error types that can occur while writing documents
//! to the search index, and which of them should stop a migration run.

use thiserror::Error;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchIndexError {
    /// Failed to set up or verify the connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A request never produced a response (network failure, timeout, TLS).
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The service answered, but is not accepting writes at all
    /// (bad credentials or the cluster is unavailable).
    #[error("Search service unavailable (status {status}): {reason}")]
    Unavailable { status: u16, reason: String },

    /// The service rejected this particular document.
    #[error("Document rejected (status {status}): {reason}")]
    Rejected { status: u16, reason: String },

    /// The document could not be encoded for the wire.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchIndexError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Classify a non-success HTTP status returned for a single write.
    ///
    /// Authentication failures and gateway/availability errors affect every
    /// document and are reported as [`SearchIndexError::Unavailable`]. Any
    /// other status is scoped to the document that was sent.
    pub fn from_status(status: u16, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        match status {
            401 | 403 | 502 | 503 | 504 => Self::Unavailable { status, reason },
            _ => Self::Rejected { status, reason },
        }
    }

    /// Returns true if the error means no further writes can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError(_) | Self::TransportError(_) | Self::Unavailable { .. }
        )
    }
}
