//! # Search Migrator Pipeline
//!
//! This crate provides the pipeline components for copying author records
//! from MySQL into the search index.
//!
//! ## Architecture
//!
//! The pipeline is a single reader feeding a pool of indexing workers:
//!
//! 1. **Source**: Streams rows of the source query as records
//! 2. **Queue**: Bounded channel between the reader and the workers
//! 3. **Worker**: Upserts each record into the search index
//! 4. **Orchestrator**: Coordinates the run and reports its outcome

pub mod errors;
pub mod orchestrator;
pub mod queue;
pub mod source;
pub mod summary;
pub mod worker;

#[cfg(test)]
mod test_utils;

pub use errors::PipelineError;
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use summary::{RunReport, RunState, RunStatus, RunSummary};
