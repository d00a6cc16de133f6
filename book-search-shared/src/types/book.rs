//! Book records as owned by the primary store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of characters in a book description.
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Exact number of characters in an ISBN.
pub const ISBN_LEN: usize = 13;

/// A book as stored in the primary store.
///
/// The `id` is assigned by the store on creation and never changes. It is also
/// the document id used in the search index, which is how the two stores are
/// correlated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub isbn: String,
    pub price: f64,
}

/// A book that has not been written to the primary store yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub isbn: String,
    pub price: f64,
}

/// A rule violated by a [`NewBook`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("description must be at least {MIN_DESCRIPTION_LEN} characters, got {0}")]
    DescriptionTooShort(usize),

    #[error("isbn must be exactly {ISBN_LEN} characters, got {0}")]
    InvalidIsbnLength(usize),

    #[error("price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
}

impl NewBook {
    /// Check the field rules the primary store enforces before a write.
    ///
    /// ISBN uniqueness is not checked here since it needs the store itself.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Required("title"));
        }
        if self.author.trim().is_empty() {
            return Err(ValidationError::Required("author"));
        }

        let description_len = self.description.chars().count();
        if description_len < MIN_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooShort(description_len));
        }

        let isbn_len = self.isbn.chars().count();
        if isbn_len != ISBN_LEN {
            return Err(ValidationError::InvalidIsbnLength(isbn_len));
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::InvalidPrice(self.price));
        }

        Ok(())
    }

    /// Attach the store-assigned id, producing the persisted record.
    pub fn into_record(self, id: i64) -> BookRecord {
        BookRecord {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            isbn: self.isbn,
            price: self.price,
        }
    }
}
