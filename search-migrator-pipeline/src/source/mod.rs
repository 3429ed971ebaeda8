//! Row source module for the search migrator pipeline.
//!
//! A row source executes one read query and exposes the result as a lazy,
//! forward-only stream of records.

mod mysql;
mod row;

use async_trait::async_trait;
use futures::stream::BoxStream;
use search_migrator_shared::Record;

use crate::errors::PipelineError;

pub use mysql::{MySqlConnectionConfig, MySqlRowSource, DEFAULT_SOURCE_QUERY};
pub use row::SourceRow;

/// A forward-only cursor over the rows of a single query.
///
/// The stream returned by [`RowSource::records`] is not restartable. Callers
/// must release the underlying connection with [`RowSource::close`] once they
/// stop reading, whether or not the stream was exhausted.
#[async_trait]
pub trait RowSource: Send {
    /// Stream the query result, one record per row.
    ///
    /// Yields `Err(PipelineError::DecodeError)` for rows that cannot be mapped
    /// onto a [`Record`].
    fn records(&mut self) -> BoxStream<'_, Result<Record, PipelineError>>;

    /// Release the cursor and the connection.
    async fn close(self) -> Result<(), PipelineError>;
}
