//! Dependency initialization and wiring for the search migrator.

use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::MigratorError;
use search_migrator_pipeline::{source::MySqlRowSource, Orchestrator, PipelineError};
use search_migrator_repository::{OpenSearchClient, SearchIndexProvider};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator<MySqlRowSource>,
}

impl Dependencies {
    /// Open both clients and build the orchestrator.
    ///
    /// The search engine is checked before the source is opened, so a
    /// misconfigured index never holds a database connection.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(MigratorError)` - If either side cannot be reached or the query is rejected
    pub async fn new(settings: &Settings) -> Result<Self, MigratorError> {
        info!(
            opensearch_url = %settings.search.url,
            index = %settings.search.index,
            workers = settings.pipeline.workers,
            "Initializing dependencies"
        );

        // Initialize OpenSearch client
        let search_client = OpenSearchClient::new(&settings.search)?;

        // Verify OpenSearch is reachable
        let healthy = search_client.health_check().await?;
        if !healthy {
            return Err(
                PipelineError::connection("OpenSearch did not answer the health check").into(),
            );
        }

        info!("OpenSearch connection verified");

        // Open the source and prepare the query
        let options = settings.source.connect_options()?;
        let source = MySqlRowSource::open_with(options, settings.query.as_str()).await?;

        info!("Source query ready");

        let orchestrator = Orchestrator::with_config(
            source,
            Arc::new(search_client),
            settings.pipeline.clone(),
        );

        Ok(Self { orchestrator })
    }
}
