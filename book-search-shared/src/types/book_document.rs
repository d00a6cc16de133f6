//! Book document types for the search index.
//!
//! This module defines the document structure that is indexed in the search engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::book::BookRecord;

/// Document representation for the search index.
///
/// A denormalized copy of a [`BookRecord`]. Every field is copied verbatim and
/// the document is keyed by the record's id, so `document_id()` always matches
/// the primary-store identity.
///
/// # Fields
///
/// - `id`: Primary-store id, also the index document id
/// - `title`, `author`, `description`, `isbn`: Full-text searchable fields
/// - `price`: Stored for display, not searched
/// - `indexed_at`: When the document was built for indexing. Documents written
///   by older tooling may not carry it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookDocument {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub isbn: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_at: Option<DateTime<Utc>>,
}

impl BookDocument {
    /// Build a document from a primary-store record, stamped with the current time.
    ///
    /// # Example
    ///
    /// ```
    /// use book_search_shared::{BookDocument, BookRecord};
    ///
    /// let record = BookRecord {
    ///     id: 7,
    ///     title: "Dune".to_string(),
    ///     author: "Frank Herbert".to_string(),
    ///     description: "Desert planet politics.".to_string(),
    ///     isbn: "9780441172719".to_string(),
    ///     price: 9.99,
    /// };
    /// let doc = BookDocument::from_record(&record);
    /// assert_eq!(doc.document_id(), "7");
    /// ```
    pub fn from_record(record: &BookRecord) -> Self {
        Self::from(record.clone())
    }

    /// Generate the document ID used in the search index.
    pub fn document_id(&self) -> String {
        self.id.to_string()
    }

    /// Map the document back into the record shape returned to callers.
    pub fn into_record(self) -> BookRecord {
        BookRecord {
            id: self.id,
            title: self.title,
            author: self.author,
            description: self.description,
            isbn: self.isbn,
            price: self.price,
        }
    }
}

impl From<BookRecord> for BookDocument {
    fn from(record: BookRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            author: record.author,
            description: record.description,
            isbn: record.isbn,
            price: record.price,
            indexed_at: Some(Utc::now()),
        }
    }
}
