//! Run state, outcome aggregation and reporting.

use std::fmt;

use crate::errors::PipelineError;
use crate::worker::IndexOutcome;

/// Why a single document could not be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The record could not be serialized.
    Serialization,
    /// The search service rejected the document.
    Rejection,
}

/// A non-fatal failure scoped to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    pub document_id: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl DocumentFailure {
    pub fn serialization(document_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            kind: FailureKind::Serialization,
            reason: reason.into(),
        }
    }

    pub fn rejection(document_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            kind: FailureKind::Rejection,
            reason: reason.into(),
        }
    }
}

/// Counters for a run, or for the share of a run handled by one worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records read from the source.
    pub fetched: usize,
    /// Documents written successfully.
    pub succeeded: usize,
    /// Attempts that ended the run.
    pub aborted: usize,
    /// Documents that could not be written.
    pub failures: Vec<DocumentFailure>,
}

impl RunSummary {
    /// Count one upsert attempt.
    pub fn record(&mut self, outcome: &IndexOutcome) {
        match outcome {
            IndexOutcome::Indexed { .. } => self.succeeded += 1,
            IndexOutcome::Failed(failure) => self.failures.push(failure.clone()),
            IndexOutcome::Aborted { .. } => self.aborted += 1,
        }
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: RunSummary) {
        self.fetched += other.fetched;
        self.succeeded += other.succeeded;
        self.aborted += other.aborted;
        self.failures.extend(other.failures);
    }

    /// Number of upsert attempts.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failures.len() + self.aborted
    }

    /// Number of non-fatal per-document failures.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Terminal result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed,
}

/// Lifecycle of a run. There is no way back from `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// Fetching from the source and indexing concurrently.
    Running,
    /// The source is closed; workers are emptying the queue.
    Draining,
    Done(RunOutcome),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed(PipelineError),
}

/// Everything the orchestrator knows at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub summary: RunSummary,
    pub status: RunStatus,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Succeeded)
    }

    pub fn outcome(&self) -> RunOutcome {
        match self.status {
            RunStatus::Succeeded => RunOutcome::Succeeded,
            RunStatus::Failed(_) => RunOutcome::Failed,
        }
    }

    /// The fatal error that ended the run, if any.
    pub fn error(&self) -> Option<&PipelineError> {
        match &self.status {
            RunStatus::Succeeded => None,
            RunStatus::Failed(err) => Some(err),
        }
    }

    /// Convert into a `Result`, dropping the summary of a failed run.
    pub fn into_result(self) -> Result<RunSummary, PipelineError> {
        match self.status {
            RunStatus::Succeeded => Ok(self.summary),
            RunStatus::Failed(err) => Err(err),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            RunStatus::Succeeded => write!(
                f,
                "run succeeded: {} documents processed, {} indexed, {} failed",
                self.summary.processed(),
                self.summary.succeeded,
                self.summary.failed()
            ),
            RunStatus::Failed(err) => write!(
                f,
                "run failed with {}: {} ({} documents indexed before the halt, {} failed)",
                err.category(),
                err,
                self.summary.succeeded,
                self.summary.failed()
            ),
        }
    }
}
