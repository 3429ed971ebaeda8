//! Index document wire format.

use serde::{Deserialize, Serialize};

use crate::record::{Book, Record};

/// Nested book object of an indexed author document.
///
/// Always serialized, even for authors without a book, in which case every
/// field is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDocument {
    pub title: String,
    pub description: String,
    pub publish_date: String,
}

/// Author document as stored in the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDocument {
    pub id: i64,
    pub name: String,
    pub bio: String,
    pub birth_date: String,
    pub books: BookDocument,
}

impl From<Book> for BookDocument {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            description: book.description,
            publish_date: book.publish_date,
        }
    }
}

impl From<Record> for AuthorDocument {
    fn from(record: Record) -> Self {
        Self {
            id: record.id(),
            name: record.name,
            bio: record.bio,
            birth_date: record.birth_date,
            books: record.book.into(),
        }
    }
}

impl From<&Record> for AuthorDocument {
    fn from(record: &Record) -> Self {
        record.clone().into()
    }
}
