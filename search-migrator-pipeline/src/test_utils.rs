//! In-memory row source and search index used by the pipeline tests.

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use search_migrator_repository::{SearchIndexError, SearchIndexProvider};
use search_migrator_shared::{Book, Record};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::PipelineError;
use crate::source::RowSource;

pub(crate) fn author(id: i64, book: Option<(&str, &str, &str)>) -> Record {
    Record::new(
        id,
        format!("Author {}", id),
        format!("Bio of author {}", id),
        "1950-01-01",
        book.map(|(title, description, date)| Book::new(title, description, date)),
    )
}

/// Row source over a fixed list of rows.
pub(crate) struct VecSource {
    rows: Vec<Result<Record, PipelineError>>,
    closed: Arc<AtomicBool>,
}

impl VecSource {
    pub(crate) fn new(rows: Vec<Result<Record, PipelineError>>) -> Self {
        Self {
            rows,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn from_records(records: Vec<Record>) -> Self {
        Self::new(records.into_iter().map(Ok).collect())
    }

    /// Flag set once the source is closed.
    pub(crate) fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

#[async_trait]
impl RowSource for VecSource {
    fn records(&mut self) -> BoxStream<'_, Result<Record, PipelineError>> {
        futures::stream::iter(std::mem::take(&mut self.rows)).boxed()
    }

    async fn close(self) -> Result<(), PipelineError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Search index keeping documents in a map.
#[derive(Default)]
pub(crate) struct MockIndex {
    documents: Mutex<HashMap<String, Value>>,
    attempts: Mutex<Vec<String>>,
    rejected: HashSet<String>,
    unreachable: HashSet<String>,
    delay: Option<Duration>,
}

impl MockIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reject these document ids with a mapping error.
    pub(crate) fn rejecting(mut self, ids: &[&str]) -> Self {
        self.rejected.extend(ids.iter().map(|id| id.to_string()));
        self
    }

    /// Fail with a transport error when these document ids are written.
    pub(crate) fn unreachable_on(mut self, ids: &[&str]) -> Self {
        self.unreachable.extend(ids.iter().map(|id| id.to_string()));
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Document ids in the order their writes were attempted.
    pub(crate) fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub(crate) fn document(&self, id: &str) -> Option<Value> {
        self.documents.lock().unwrap().get(id).cloned()
    }

    pub(crate) fn documents(&self) -> HashMap<String, Value> {
        self.documents.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchIndexProvider for MockIndex {
    async fn upsert_document(
        &self,
        document_id: &str,
        body: Value,
    ) -> Result<(), SearchIndexError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.attempts.lock().unwrap().push(document_id.to_string());

        if self.unreachable.contains(document_id) {
            return Err(SearchIndexError::transport("connection refused"));
        }
        if self.rejected.contains(document_id) {
            return Err(SearchIndexError::from_status(
                400,
                "mapper_parsing_exception",
            ));
        }

        self.documents
            .lock()
            .unwrap()
            .insert(document_id.to_string(), body);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        Ok(true)
    }
}
