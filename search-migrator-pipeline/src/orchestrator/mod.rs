//! Orchestrator module for the search migrator pipeline.
//!
//! Coordinates the row source, the work queue and the indexing workers for a
//! single run.

use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::queue::{work_queue, QueueProducer};
use crate::source::RowSource;
use crate::summary::{RunReport, RunState, RunStatus, RunSummary};
use crate::worker::IndexingWorker;
use search_migrator_repository::SearchIndexProvider;
use search_migrator_shared::Record;

/// Default number of indexing workers.
pub const DEFAULT_WORKERS: usize = 5;

/// Configuration for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Number of concurrent indexing workers.
    pub workers: usize,
    /// Capacity of the work queue. `None` uses the worker count.
    pub queue_capacity: Option<usize>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: None,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Effective capacity of the work queue.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(self.workers)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.workers == 0 {
            return Err(PipelineError::config("worker count must be at least 1"));
        }
        if self.queue_capacity() == 0 {
            return Err(PipelineError::config("queue capacity must be at least 1"));
        }
        Ok(())
    }
}

/// Orchestrator that owns one migration run.
///
/// The orchestrator:
/// - Starts the indexing workers
/// - Streams records from the source into the work queue on the calling task
/// - Closes the queue when the source is done and waits for every worker
/// - Turns the first fatal error into an orderly abort
pub struct Orchestrator<S: RowSource> {
    source: S,
    client: Arc<dyn SearchIndexProvider>,
    config: OrchestratorConfig,
    abort: CancellationToken,
    state_tx: watch::Sender<RunState>,
}

impl<S: RowSource> Orchestrator<S> {
    /// Create a new orchestrator with the default configuration.
    pub fn new(source: S, client: Arc<dyn SearchIndexProvider>) -> Self {
        Self::with_config(source, client, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        source: S,
        client: Arc<dyn SearchIndexProvider>,
        config: OrchestratorConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(RunState::Idle);

        Self {
            source,
            client,
            config,
            abort: CancellationToken::new(),
            state_tx,
        }
    }

    /// Follow the run state.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state_tx.subscribe()
    }

    /// Token that aborts the run when cancelled, e.g. on a shutdown signal.
    pub fn abort_handle(&self) -> CancellationToken {
        self.abort.clone()
    }

    /// Run the migration to completion.
    ///
    /// Always returns a report; a failed run carries the fatal error in
    /// [`RunReport::status`]. The source is closed before returning.
    #[instrument(skip_all)]
    pub async fn run(self) -> RunReport {
        let Orchestrator {
            mut source,
            client,
            config,
            abort,
            state_tx,
        } = self;

        if let Err(e) = config.validate() {
            close_source(source).await;
            return finish(&state_tx, RunSummary::default(), Some(e));
        }

        info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity(),
            "Starting migration run"
        );
        state_tx.send_replace(RunState::Running);

        let (producer, consumer) = work_queue::<Record>(config.queue_capacity());

        let mut workers = JoinSet::new();
        for id in 1..=config.workers {
            let worker = IndexingWorker::new(id, consumer.clone(), client.clone(), abort.clone());
            workers.spawn(worker.run());
        }
        drop(consumer);

        let mut summary = RunSummary::default();
        let read_result = pump(&mut source, &producer, &abort, &mut summary.fetched).await;
        producer.close();

        let mut fatal = read_result.err();
        if let Some(e) = &fatal {
            error!(error = %e, "Reading from source failed, aborting run");
            abort.cancel();
        }

        info!(fetched = summary.fetched, "Reader finished, waiting for workers");
        state_tx.send_replace(RunState::Draining);

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(report) => {
                    summary.merge(report.summary);
                    if fatal.is_none() {
                        fatal = report.fatal;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Indexing worker task failed");
                    abort.cancel();
                    if fatal.is_none() {
                        fatal = Some(PipelineError::worker(e.to_string()));
                    }
                }
            }
        }

        close_source(source).await;

        if fatal.is_none() && abort.is_cancelled() {
            fatal = Some(PipelineError::Cancelled);
        }

        finish(&state_tx, summary, fatal)
    }
}

/// Move records from the source into the queue until the source is
/// exhausted, a record fails to decode, or the run is aborted.
async fn pump<S: RowSource>(
    source: &mut S,
    producer: &QueueProducer<Record>,
    abort: &CancellationToken,
    fetched: &mut usize,
) -> Result<(), PipelineError> {
    let mut records = source.records();

    loop {
        let next = tokio::select! {
            biased;
            _ = abort.cancelled() => return Ok(()),
            next = records.next() => next,
        };

        let Some(record) = next else {
            return Ok(());
        };
        let record = record?;
        *fetched += 1;

        tokio::select! {
            biased;
            _ = abort.cancelled() => return Ok(()),
            pushed = producer.push(record) => {
                if pushed.is_err() {
                    warn!("All indexing workers exited, stopping reader");
                    return Ok(());
                }
            }
        }
    }
}

async fn close_source<S: RowSource>(source: S) {
    match source.close().await {
        Ok(()) => debug!("Source closed"),
        Err(e) => warn!(error = %e, "Failed to close source"),
    }
}

fn finish(
    state_tx: &watch::Sender<RunState>,
    summary: RunSummary,
    fatal: Option<PipelineError>,
) -> RunReport {
    let status = match fatal {
        None => RunStatus::Succeeded,
        Some(e) => RunStatus::Failed(e),
    };
    let report = RunReport { summary, status };

    state_tx.send_replace(RunState::Done(report.outcome()));

    if report.is_success() {
        info!(
            processed = report.summary.processed(),
            succeeded = report.summary.succeeded,
            failed = report.summary.failed(),
            "Migration run complete"
        );
    } else {
        error!(
            succeeded = report.summary.succeeded,
            failed = report.summary.failed(),
            "{}",
            report
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{FailureKind, RunOutcome};
    use crate::test_utils::{author, MockIndex, VecSource};
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn config(workers: usize, capacity: usize) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .with_workers(workers)
            .with_queue_capacity(capacity)
    }

    #[tokio::test]
    async fn test_authors_with_and_without_books() {
        let index = Arc::new(MockIndex::new());
        let source = VecSource::from_records(vec![
            author(1, Some(("First", "Debut novel", "1990-01-01"))),
            author(1, Some(("Second", "Sequel", "1995-01-01"))),
            author(2, Some(("Only", "Single book", "2000-01-01"))),
            author(3, None),
        ]);
        let closed = source.closed_flag();

        let report = Orchestrator::new(source, index.clone()).run().await;

        assert!(report.is_success());
        assert_eq!(report.summary.fetched, 4);
        assert_eq!(report.summary.succeeded, 4);
        assert_eq!(index.attempts().len(), 4);
        assert!(closed.load(Ordering::SeqCst));

        let documents = index.documents();
        assert_eq!(documents.len(), 3);

        let third = &documents["3"];
        assert_eq!(third["books"]["title"], "");
        assert_eq!(third["books"]["description"], "");
        assert_eq!(third["books"]["publish_date"], "");

        let second = &documents["2"];
        assert_eq!(second["books"]["title"], "Only");
        assert_eq!(second["books"]["description"], "Single book");
        assert_eq!(second["books"]["publish_date"], "2000-01-01");

        // Both rows of author 1 hit the same document; either may win.
        let first_title = documents["1"]["books"]["title"].as_str().unwrap().to_string();
        assert!(first_title == "First" || first_title == "Second");
        assert_eq!(index.attempts().iter().filter(|id| *id == "1").count(), 2);
    }

    #[tokio::test]
    async fn test_rejections_do_not_fail_the_run() {
        let index = Arc::new(MockIndex::new().rejecting(&["4", "7"]));
        let source = VecSource::from_records((1..=10).map(|id| author(id, None)).collect());

        let report = Orchestrator::new(source, index.clone()).run().await;

        assert_eq!(report.status, RunStatus::Succeeded);
        assert_eq!(report.summary.succeeded, 8);
        assert_eq!(report.summary.failed(), 2);
        assert!(report
            .summary
            .failures
            .iter()
            .all(|f| f.kind == FailureKind::Rejection));

        let mut failed_ids: Vec<_> = report
            .summary
            .failures
            .iter()
            .map(|f| f.document_id.as_str())
            .collect();
        failed_ids.sort_unstable();
        assert_eq!(failed_ids, vec!["4", "7"]);
    }

    #[tokio::test]
    async fn test_transport_error_fails_the_run_and_stops_dequeuing() {
        let index = Arc::new(MockIndex::new().unreachable_on(&["3"]));
        let source = VecSource::from_records((1..=10).map(|id| author(id, None)).collect());
        let closed = source.closed_flag();

        let orchestrator = Orchestrator::with_config(source, index.clone(), config(1, 1));
        let state = orchestrator.subscribe();
        let report = orchestrator.run().await;

        assert!(matches!(
            report.error(),
            Some(PipelineError::TransportError(_))
        ));
        assert_eq!(*state.borrow(), RunState::Done(RunOutcome::Failed));
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(index.attempts(), vec!["1", "2", "3"]);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_abort_with_many_workers_reaches_failed() {
        let index = Arc::new(
            MockIndex::new()
                .unreachable_on(&["20"])
                .with_delay(Duration::from_millis(1)),
        );
        let source = VecSource::from_records((1..=200).map(|id| author(id, None)).collect());

        let report = Orchestrator::with_config(source, index.clone(), config(5, 5))
            .run()
            .await;

        assert_eq!(report.error().map(|e| e.category()), Some("TransportError"));
        assert!(index.attempts().len() < 200);
        assert_eq!(report.summary.processed(), index.attempts().len());
    }

    #[tokio::test]
    async fn test_decode_error_fails_the_run() {
        let index = Arc::new(MockIndex::new());
        let source = VecSource::new(vec![
            Ok(author(1, None)),
            Ok(author(2, None)),
            Err(PipelineError::decode("row 3: column `name` is null")),
            Ok(author(4, None)),
        ]);
        let closed = source.closed_flag();

        let report = Orchestrator::with_config(source, index.clone(), config(1, 4))
            .run()
            .await;

        assert_eq!(report.error().map(|e| e.category()), Some("DecodeError"));
        assert_eq!(report.summary.fetched, 2);
        assert!(!index.attempts().contains(&"4".to_string()));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_record_is_indexed_exactly_once() {
        let index = Arc::new(MockIndex::new());
        let source = VecSource::from_records((1..=300).map(|id| author(id, None)).collect());

        let report = Orchestrator::with_config(source, index.clone(), config(8, 3))
            .run()
            .await;

        assert!(report.is_success());
        assert_eq!(report.summary.succeeded, 300);

        let mut counts: HashMap<String, usize> = HashMap::new();
        for id in index.attempts() {
            *counts.entry(id).or_default() += 1;
        }
        assert_eq!(counts.len(), 300);
        assert!(counts.values().all(|&n| n == 1));
    }

    #[tokio::test]
    async fn test_rerun_produces_the_same_documents() {
        let index = Arc::new(MockIndex::new());
        let rows = || {
            VecSource::from_records(vec![
                author(1, Some(("Book", "About", "1999-09-09"))),
                author(2, None),
                author(3, Some(("Other", "More", "2010-10-10"))),
            ])
        };

        assert!(Orchestrator::new(rows(), index.clone()).run().await.is_success());
        let first = index.documents();

        assert!(Orchestrator::new(rows(), index.clone()).run().await.is_success());
        let second = index.documents();

        assert_eq!(first, second);
        assert_eq!(second.len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_any_work() {
        let index = Arc::new(MockIndex::new());
        let source = VecSource::from_records(vec![author(1, None)]);
        let closed = source.closed_flag();

        let report = Orchestrator::with_config(source, index.clone(), config(0, 1))
            .run()
            .await;

        assert_eq!(report.error().map(|e| e.category()), Some("ConfigError"));
        assert!(index.attempts().is_empty());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_external_abort_reports_cancelled() {
        let index = Arc::new(MockIndex::new());
        let source = VecSource::from_records((1..=5).map(|id| author(id, None)).collect());

        let orchestrator = Orchestrator::new(source, index.clone());
        orchestrator.abort_handle().cancel();
        let report = orchestrator.run().await;

        assert_eq!(report.error(), Some(&PipelineError::Cancelled));
        assert!(index.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_state_moves_from_idle_to_done() {
        let index = Arc::new(MockIndex::new());
        let source = VecSource::from_records(vec![author(1, None)]);

        let orchestrator = Orchestrator::new(source, index);
        let state = orchestrator.subscribe();
        assert_eq!(*state.borrow(), RunState::Idle);

        let report = orchestrator.run().await;

        assert!(report.is_success());
        assert_eq!(*state.borrow(), RunState::Done(RunOutcome::Succeeded));
    }

    #[test]
    fn test_queue_capacity_defaults_to_worker_count() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.queue_capacity(), DEFAULT_WORKERS);

        let config = OrchestratorConfig::default().with_workers(3);
        assert_eq!(config.queue_capacity(), 3);

        let config = config.with_queue_capacity(16);
        assert_eq!(config.queue_capacity(), 16);
        assert!(config.validate().is_ok());

        assert!(OrchestratorConfig::default()
            .with_queue_capacity(0)
            .validate()
            .is_err());
    }
}
