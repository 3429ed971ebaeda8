//! Record types produced by the row source.

/// A book associated with an author through the outer join.
///
/// An absent book is represented by `Book::default()`, where every field is
/// the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub description: String,
    pub publish_date: String,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        publish_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            publish_date: publish_date.into(),
        }
    }

    /// Returns true when this is the canonical "no book" value.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty() && self.publish_date.is_empty()
    }
}

/// One source row: an author plus zero or one book.
///
/// The `id` is fixed at construction and only exposed through [`Record::id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: i64,
    pub name: String,
    pub bio: String,
    pub birth_date: String,
    pub book: Book,
}

impl Record {
    /// Create a new record. Pass `None` for an author without a book.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        bio: impl Into<String>,
        birth_date: impl Into<String>,
        book: Option<Book>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            bio: bio.into(),
            birth_date: birth_date.into(),
            book: book.unwrap_or_default(),
        }
    }

    /// The stable source identifier.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The index document identifier: the decimal form of [`Record::id`].
    pub fn document_id(&self) -> String {
        self.id.to_string()
    }

    /// Returns true when the record carries an associated book.
    pub fn has_book(&self) -> bool {
        !self.book.is_empty()
    }
}
