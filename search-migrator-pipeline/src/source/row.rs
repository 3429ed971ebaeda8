//! Mapping of raw source rows onto records.

use search_migrator_shared::{Book, Record};
use sqlx::{mysql::MySqlRow, Row};

use crate::errors::PipelineError;

/// Raw column values of one row of the source query.
///
/// Columns are read by position:
/// `(id, name, bio, birth_date, title, description, publish_date)`.
/// The book columns come from an outer join and are null for authors
/// without books.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    pub id: i64,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub publish_date: Option<String>,
}

impl SourceRow {
    /// Read the column values of a MySQL row.
    pub fn from_mysql_row(row: &MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get(0)?,
            name: row.try_get(1)?,
            bio: row.try_get(2)?,
            birth_date: row.try_get(3)?,
            title: row.try_get(4)?,
            description: row.try_get(5)?,
            publish_date: row.try_get(6)?,
        })
    }

    fn book(&mut self) -> Option<Book> {
        if self.title.is_none() && self.description.is_none() && self.publish_date.is_none() {
            return None;
        }

        // A partially populated book is still a book.
        Some(Book::new(
            self.title.take().unwrap_or_default(),
            self.description.take().unwrap_or_default(),
            self.publish_date.take().unwrap_or_default(),
        ))
    }
}

fn required(id: i64, column: &str, value: Option<String>) -> Result<String, PipelineError> {
    value.ok_or_else(|| PipelineError::decode(format!("row {}: column `{}` is null", id, column)))
}

impl TryFrom<SourceRow> for Record {
    type Error = PipelineError;

    fn try_from(mut row: SourceRow) -> Result<Self, Self::Error> {
        let book = row.book();
        let id = row.id;

        Ok(Record::new(
            id,
            required(id, "name", row.name)?,
            required(id, "bio", row.bio)?,
            required(id, "birth_date", row.birth_date)?,
            book,
        ))
    }
}
