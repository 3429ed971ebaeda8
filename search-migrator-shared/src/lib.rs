//! # Search Migrator Shared
//!
//! Types shared between the pipeline and the search repository crates.
//!
//! A [`Record`] is the unit of transfer: one source row, combining an author
//! with at most one of their books. An [`AuthorDocument`] is the shape a
//! record takes on the wire when it is written to the search index.

mod document;
mod record;

pub use document::{AuthorDocument, BookDocument};
pub use record::{Book, Record};
