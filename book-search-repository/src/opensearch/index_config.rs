//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the book search index.

use serde_json::{json, Value};

/// Configuration for the search index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The alias name for the search index (used for all operations).
    pub alias: String,
    /// The version number for the index (e.g., 0 for "books_v0").
    pub version: u32,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `alias` - The index alias name
    /// * `version` - The version number
    pub fn new(alias: impl Into<String>, version: u32) -> Self {
        Self {
            alias: alias.into(),
            version,
        }
    }

    /// The concrete index the alias points at.
    pub fn versioned_index_name(&self) -> String {
        get_versioned_index_name(Some(self.version))
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(INDEX_NAME, 0)
    }
}

/// The base name of the search index (without version).
pub const INDEX_NAME: &str = "books";

/// Fields matched by free-text queries.
pub const SEARCH_FIELDS: [&str; 4] = ["title", "author", "description", "isbn"];

/// Get the versioned index name.
///
/// # Arguments
///
/// * `version` - The version number (defaults to 0 if None)
///
/// # Returns
///
/// The versioned index name (e.g., "books_v0")
pub fn get_versioned_index_name(version: Option<u32>) -> String {
    let v = version.unwrap_or(0);
    format!("{}_v{}", INDEX_NAME, v)
}

/// Get the index settings and mappings for the book search index.
///
/// The configuration includes:
/// - **text**: title, author and description, analyzed for full-text matching
/// - **isbn**: text so partial input still matches, with a `raw` keyword sub-field
///   for exact lookups
/// - **price** and **id**: stored numerics, not searched
///
/// The alias is attached at creation time so the index is usable as soon as
/// the create call returns.
pub fn get_index_settings(alias: &str) -> Value {
    let mut aliases = serde_json::Map::new();
    aliases.insert(alias.to_string(), json!({ "is_write_index": true }));

    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "aliases": aliases,
        "mappings": {
            "properties": {
                "id": {
                    "type": "long"
                },
                "title": {
                    "type": "text",
                    "fields": {
                        "raw": {
                            "type": "keyword"
                        }
                    }
                },
                "author": {
                    "type": "text",
                    "fields": {
                        "raw": {
                            "type": "keyword"
                        }
                    }
                },
                "description": {
                    "type": "text"
                },
                "isbn": {
                    "type": "text",
                    "fields": {
                        "raw": {
                            "type": "keyword"
                        }
                    }
                },
                "price": {
                    "type": "scaled_float",
                    "scaling_factor": 100
                },
                "indexed_at": {
                    "type": "date"
                }
            }
        }
    })
}
