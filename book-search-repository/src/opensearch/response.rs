//! Parsing of OpenSearch response bodies.
//!
//! Kept apart from the provider so the wire format can be tested without a
//! running node.

use book_search_shared::BookDocument;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationResult, BatchOperationSummary, SearchHits};

/// The `_source` of a search hit.
///
/// The id comes from the hit's `_id`, which is the join key with the primary
/// store, so it is not read from the source.
#[derive(Debug, Deserialize)]
struct HitSource {
    title: String,
    author: String,
    description: String,
    isbn: String,
    price: Value,
    #[serde(default)]
    indexed_at: Option<DateTime<Utc>>,
}

/// Turn a bulk response into per-document outcomes.
///
/// `items` in the response are in the same order as the documents sent.
pub(crate) fn parse_bulk_response(
    documents: &[BookDocument],
    body: &Value,
) -> Result<BatchOperationSummary, SearchIndexError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchIndexError::parse("Bulk response has no items array"))?;

    if items.len() != documents.len() {
        return Err(SearchIndexError::parse(format!(
            "Bulk response has {} items for {} documents",
            items.len(),
            documents.len()
        )));
    }

    let results = documents
        .iter()
        .zip(items)
        .map(|(doc, item)| {
            let action = item.get("index").unwrap_or(item);
            let status = action.get("status").and_then(Value::as_u64).unwrap_or(0);

            match action.get("error") {
                None if (200..300).contains(&status) => BatchOperationResult::succeeded(doc.id),
                error => BatchOperationResult::failed(
                    doc.id,
                    SearchIndexError::write_failed(describe_item_error(status, error)),
                ),
            }
        })
        .collect();

    Ok(BatchOperationSummary::from_results(results))
}

fn describe_item_error(status: u64, error: Option<&Value>) -> String {
    let Some(error) = error else {
        return format!("status {}", status);
    };

    let kind = error.get("type").and_then(Value::as_str).unwrap_or("unknown");
    let reason = error.get("reason").and_then(Value::as_str).unwrap_or("");
    format!("status {}: {}: {}", status, kind, reason)
}

/// Turn a search response into matched documents and the total match count.
pub(crate) fn parse_search_response(body: &Value) -> Result<SearchHits, SearchIndexError> {
    let hits = body
        .get("hits")
        .ok_or_else(|| SearchIndexError::parse("Search response has no hits"))?;

    // `total` is an object on current versions and a bare number on old ones.
    let total = match hits.get("total") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(total) => total.get("value").and_then(Value::as_u64),
        None => None,
    }
    .ok_or_else(|| SearchIndexError::parse("Search response has no total"))?;

    let documents = hits
        .get("hits")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(parse_hit).collect::<Result<Vec<_>, _>>())
        .transpose()?
        .unwrap_or_default();

    Ok(SearchHits::new(documents, total))
}

fn parse_hit(hit: &Value) -> Result<BookDocument, SearchIndexError> {
    let id = hit
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| SearchIndexError::parse("Search hit has no _id"))?;
    let id = id
        .parse::<i64>()
        .map_err(|e| SearchIndexError::parse(format!("Invalid document id '{}': {}", id, e)))?;

    let source = hit
        .get("_source")
        .cloned()
        .ok_or_else(|| SearchIndexError::parse(format!("Search hit {} has no _source", id)))?;
    let source: HitSource = serde_json::from_value(source)
        .map_err(|e| SearchIndexError::parse(format!("Search hit {}: {}", id, e)))?;

    let price = parse_price(&source.price)
        .ok_or_else(|| SearchIndexError::parse(format!("Search hit {} has an invalid price", id)))?;

    Ok(BookDocument {
        id,
        title: source.title,
        author: source.author,
        description: source.description,
        isbn: source.isbn,
        price,
        indexed_at: source.indexed_at,
    })
}

/// Prices are numbers when written by this crate, but older writers stored
/// decimal columns as strings.
fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    price.is_finite().then_some(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: i64) -> BookDocument {
        BookDocument {
            id,
            title: format!("Book {}", id),
            author: "Author".to_string(),
            description: "A description long enough.".to_string(),
            isbn: format!("{:013}", id),
            price: 10.0,
            indexed_at: None,
        }
    }

    #[test]
    fn test_bulk_all_succeeded() {
        let docs = vec![doc(1), doc(2)];
        let body = json!({
            "took": 3,
            "errors": false,
            "items": [
                { "index": { "_id": "1", "status": 201, "result": "created" } },
                { "index": { "_id": "2", "status": 200, "result": "updated" } }
            ]
        });

        let summary = parse_bulk_response(&docs, &body).unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_bulk_item_failure_is_isolated() {
        let docs = vec![doc(1), doc(2), doc(3)];
        let body = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "1", "status": 201 } },
                { "index": {
                    "_id": "2",
                    "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "failed to parse field [price]" }
                } },
                { "index": { "_id": "3", "status": 201 } }
            ]
        });

        let summary = parse_bulk_response(&docs, &body).unwrap();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);

        let failure = summary.failures().next().unwrap();
        assert_eq!(failure.document_id, 2);
        match &failure.error {
            Some(SearchIndexError::IndexWriteFailed(msg)) => {
                assert!(msg.contains("mapper_parsing_exception"));
                assert!(msg.contains("400"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bulk_item_count_mismatch() {
        let docs = vec![doc(1), doc(2)];
        let body = json!({ "items": [ { "index": { "_id": "1", "status": 201 } } ] });
        assert!(matches!(
            parse_bulk_response(&docs, &body),
            Err(SearchIndexError::ParseError(_))
        ));
    }

    #[test]
    fn test_search_response() {
        let body = json!({
            "hits": {
                "total": { "value": 15, "relation": "eq" },
                "hits": [
                    {
                        "_id": "11",
                        "_score": 2.1,
                        "_source": {
                            "id": 11,
                            "title": "Dune",
                            "author": "Frank Herbert",
                            "description": "Desert planet politics.",
                            "isbn": "9780441172719",
                            "price": 9.99,
                            "indexed_at": "2024-05-01T10:00:00Z"
                        }
                    },
                    {
                        "_id": "12",
                        "_score": 1.3,
                        "_source": {
                            "title": "Dune Messiah",
                            "author": "Frank Herbert",
                            "description": "The sequel to Dune.",
                            "isbn": "9780593098233",
                            "price": "12.50"
                        }
                    }
                ]
            }
        });

        let hits = parse_search_response(&body).unwrap();
        assert_eq!(hits.total, 15);
        assert_eq!(hits.documents.len(), 2);
        assert_eq!(hits.documents[0].id, 11);
        assert!(hits.documents[0].indexed_at.is_some());
        assert_eq!(hits.documents[1].id, 12);
        assert_eq!(hits.documents[1].price, 12.5);
        assert!(hits.documents[1].indexed_at.is_none());
    }

    #[test]
    fn test_search_response_no_matches() {
        let body = json!({ "hits": { "total": { "value": 0 }, "hits": [] } });
        let hits = parse_search_response(&body).unwrap();
        assert_eq!(hits, SearchHits::empty());
    }

    #[test]
    fn test_search_response_legacy_total() {
        let body = json!({ "hits": { "total": 4, "hits": [] } });
        assert_eq!(parse_search_response(&body).unwrap().total, 4);
    }

    #[test]
    fn test_search_response_bad_id() {
        let body = json!({
            "hits": {
                "total": { "value": 1 },
                "hits": [ { "_id": "abc", "_source": {} } ]
            }
        });
        assert!(matches!(
            parse_search_response(&body),
            Err(SearchIndexError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(&json!(3.5)), Some(3.5));
        assert_eq!(parse_price(&json!("7.25")), Some(7.25));
        assert_eq!(parse_price(&json!("seven")), None);
        assert_eq!(parse_price(&json!(null)), None);
    }
}
