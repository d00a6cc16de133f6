use book_search_shared::BookRecord;

/// A primary-store change the synchronizer reacts to.
///
/// Only creation is propagated. Updates and deletes do not reach the index
/// until the next full reindex.
#[derive(Debug, Clone, PartialEq)]
pub enum BookEvent {
    Created(BookRecord),
}

impl BookEvent {
    pub fn book_id(&self) -> i64 {
        match self {
            Self::Created(record) => record.id,
        }
    }
}
