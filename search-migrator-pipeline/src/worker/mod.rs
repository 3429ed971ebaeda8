//! Indexing worker for the search migrator pipeline.
//!
//! Each worker takes records off the work queue one at a time and writes
//! them to the search index.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::errors::PipelineError;
use crate::queue::QueueConsumer;
use crate::summary::{DocumentFailure, RunSummary};
use search_migrator_repository::SearchIndexProvider;
use search_migrator_shared::{AuthorDocument, Record};

/// Result of one upsert attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// The document was written.
    Indexed { document_id: String },
    /// The document was not written; the run continues.
    Failed(DocumentFailure),
    /// The search service cannot be used any more; the run stops.
    Aborted {
        document_id: String,
        error: PipelineError,
    },
}

impl IndexOutcome {
    fn log(&self, worker_id: usize) {
        match self {
            Self::Indexed { document_id } => {
                info!(worker_id, document_id = %document_id, "Document indexed");
            }
            Self::Failed(failure) => {
                warn!(
                    worker_id,
                    document_id = %failure.document_id,
                    kind = ?failure.kind,
                    reason = %failure.reason,
                    "Document not indexed"
                );
            }
            Self::Aborted { document_id, error } => {
                error!(
                    worker_id,
                    document_id = %document_id,
                    error = %error,
                    "Search index unreachable, aborting run"
                );
            }
        }
    }
}

/// What a worker did before it exited.
#[derive(Debug, Clone, Default)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub summary: RunSummary,
    /// Set when this worker hit a fatal error.
    pub fatal: Option<PipelineError>,
}

/// One of the N concurrent consumers of the work queue.
pub struct IndexingWorker {
    id: usize,
    queue: QueueConsumer<Record>,
    client: Arc<dyn SearchIndexProvider>,
    abort: CancellationToken,
}

impl IndexingWorker {
    pub fn new(
        id: usize,
        queue: QueueConsumer<Record>,
        client: Arc<dyn SearchIndexProvider>,
        abort: CancellationToken,
    ) -> Self {
        Self {
            id,
            queue,
            client,
            abort,
        }
    }

    /// Process records until the queue is drained or the run is aborted.
    ///
    /// A fatal outcome cancels `abort` so the reader and the other workers
    /// stop taking new work.
    pub async fn run(self) -> WorkerReport {
        let mut report = WorkerReport {
            worker_id: self.id,
            ..Default::default()
        };

        debug!(worker_id = self.id, "Indexing worker started");

        loop {
            let record = tokio::select! {
                biased;
                _ = self.abort.cancelled() => {
                    debug!(worker_id = self.id, "Abort observed, not taking new work");
                    break;
                }
                record = self.queue.pop() => match record {
                    Some(record) => record,
                    None => break,
                },
            };

            let outcome = self.index_record(record).await;
            outcome.log(self.id);
            report.summary.record(&outcome);

            if let IndexOutcome::Aborted { error, .. } = outcome {
                report.fatal = Some(error);
                self.abort.cancel();
                break;
            }
        }

        debug!(
            worker_id = self.id,
            succeeded = report.summary.succeeded,
            failed = report.summary.failed(),
            "Indexing worker finished"
        );

        report
    }

    /// Serialize a record and upsert it under its document id.
    pub async fn index_record(&self, record: Record) -> IndexOutcome {
        let document_id = record.document_id();

        let body = match serde_json::to_value(AuthorDocument::from(record)) {
            Ok(body) => body,
            Err(e) => {
                return IndexOutcome::Failed(DocumentFailure::serialization(
                    document_id,
                    e.to_string(),
                ))
            }
        };

        match self.client.upsert_document(&document_id, body).await {
            Ok(()) => IndexOutcome::Indexed { document_id },
            Err(e) if e.is_fatal() => IndexOutcome::Aborted {
                document_id,
                error: e.into(),
            },
            Err(e) => match PipelineError::from(e) {
                PipelineError::SerializationError(reason) => {
                    IndexOutcome::Failed(DocumentFailure::serialization(document_id, reason))
                }
                other => IndexOutcome::Failed(DocumentFailure::rejection(
                    document_id,
                    other.to_string(),
                )),
            },
        }
    }
}
