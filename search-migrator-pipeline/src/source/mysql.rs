//! MySQL row source.

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use search_migrator_shared::Record;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlRow},
    Connection, Executor, MySqlConnection,
};
use tracing::{debug, info, instrument};

use super::{row::SourceRow, RowSource};
use crate::errors::PipelineError;

/// Default query: every author joined with each of their books.
///
/// The left join keeps authors without books, with null book columns. Dates
/// are formatted in SQL so every column decodes as a string.
pub const DEFAULT_SOURCE_QUERY: &str = "\
SELECT CAST(authors.id AS SIGNED) AS id,
       authors.name,
       authors.bio,
       DATE_FORMAT(authors.birth_date, '%Y-%m-%d') AS birth_date,
       books.title AS title,
       books.description AS description,
       DATE_FORMAT(books.publish_date, '%Y-%m-%d') AS publish_date
FROM authors
LEFT JOIN books ON authors.id = books.author_id";

/// MySQL connection settings for the source database.
#[derive(Clone)]
pub struct MySqlConnectionConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for MySqlConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl MySqlConnectionConfig {
    /// Creates MySQL connection options for connecting to the configured database.
    pub fn with_db(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .database(&self.name);

        if let Some(password) = &self.password {
            options = options.password(password);
        }

        options
    }
}

/// Streams records from a single dedicated MySQL connection.
///
/// The connection is owned by the source and released by [`RowSource::close`];
/// dropping the source also closes the socket.
pub struct MySqlRowSource {
    conn: MySqlConnection,
    query: String,
}

impl MySqlRowSource {
    /// Connect with the given settings and prepare `query`.
    pub async fn open(
        config: &MySqlConnectionConfig,
        query: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        Self::open_with(config.with_db(), query).await
    }

    /// Connect with prebuilt options (e.g. parsed from a `mysql://` URL) and
    /// prepare `query`.
    ///
    /// # Returns
    ///
    /// * `Err(PipelineError::ConnectionError)` - If the server is unreachable or refuses the login
    /// * `Err(PipelineError::QueryError)` - If the server rejects the query
    #[instrument(skip_all)]
    pub async fn open_with(
        options: MySqlConnectOptions,
        query: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        let query = query.into();

        let mut conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| PipelineError::connection(e.to_string()))?;

        info!("Connected to source database");

        // Preparing surfaces syntax and permission errors before any row is read.
        let prepared = (&mut conn).prepare(query.as_str()).await.map(|_| ());
        if let Err(e) = prepared {
            let err = match PipelineError::from(e) {
                err @ PipelineError::ConnectionError(_) => err,
                other => PipelineError::query(other.to_string()),
            };
            let _ = conn.close().await;
            return Err(err);
        }

        debug!("Source query prepared");

        Ok(Self { conn, query })
    }
}

fn decode_row(row: Result<MySqlRow, sqlx::Error>) -> Result<Record, PipelineError> {
    let row = SourceRow::from_mysql_row(&row?)?;
    Record::try_from(row)
}

#[async_trait]
impl RowSource for MySqlRowSource {
    fn records(&mut self) -> BoxStream<'_, Result<Record, PipelineError>> {
        sqlx::query(&self.query)
            .fetch(&mut self.conn)
            .map(decode_row)
            .boxed()
    }

    async fn close(self) -> Result<(), PipelineError> {
        self.conn
            .close()
            .await
            .map_err(|e| PipelineError::connection(e.to_string()))?;

        debug!("Source connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_keeps_authors_without_books() {
        assert!(DEFAULT_SOURCE_QUERY.contains("LEFT JOIN books"));
        assert!(!DEFAULT_SOURCE_QUERY.contains("IS NOT NULL"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = MySqlConnectionConfig {
            host: "localhost".to_string(),
            port: 3306,
            name: "library".to_string(),
            username: "migrator".to_string(),
            password: Some("s3cret".to_string()),
        };

        let printed = format!("{:?}", config);

        assert!(printed.contains("migrator"));
        assert!(!printed.contains("s3cret"));
    }
}
