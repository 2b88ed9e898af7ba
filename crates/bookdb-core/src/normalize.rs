//! Schema normalization: maps the two divergent source record shapes into
//! the one document shape that gets embedded and indexed.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Genre, NormalizedDocument, StoreABook, StoreBBook, StoreTag};

/// Parse a store-A JSON batch. A record missing a required field rejects
/// the whole batch; partial-batch loss is not supported.
pub fn parse_store_a(json: &str) -> Result<Vec<StoreABook>> {
    serde_json::from_str(json).map_err(|e| Error::Schema(format!("store_a batch rejected: {e}")))
}

/// Parse a store-B JSON batch, fail-fast like [`parse_store_a`].
pub fn parse_store_b(json: &str) -> Result<Vec<StoreBBook>> {
    serde_json::from_str(json).map_err(|e| Error::Schema(format!("store_b batch rejected: {e}")))
}

/// Produce one normalized document per input record. Assigns a fresh unique
/// id, copies the embeddable text verbatim, lower-cases genre values and
/// retains store-specific extras verbatim in the side map. No side effects;
/// indexing is a separate step.
pub fn normalize(store_a: &[StoreABook], store_b: &[StoreBBook]) -> Vec<NormalizedDocument> {
    let mut documents = Vec::with_capacity(store_a.len() + store_b.len());
    documents.extend(store_a.iter().map(normalize_store_a));
    documents.extend(store_b.iter().map(normalize_store_b));
    documents
}

fn normalize_store_a(book: &StoreABook) -> NormalizedDocument {
    let mut extra = Map::new();
    extra.insert("book_id".to_string(), Value::String(book.book_id.clone()));
    extra.insert("rating".to_string(), json_f64(book.rating));
    extra.insert("description".to_string(), Value::String(book.description.clone()));
    NormalizedDocument {
        id: Uuid::new_v4().to_string(),
        text: book.description.clone(),
        store: StoreTag::StoreA,
        title: book.title.clone(),
        author: book.author.clone(),
        price: book.price,
        publication_year: book.publication_year,
        isbn: book.isbn.clone(),
        genre: Some(Genre::One(book.genre.to_lowercase())),
        extra,
    }
}

fn normalize_store_b(book: &StoreBBook) -> NormalizedDocument {
    let mut extra = Map::new();
    extra.insert("product_id".to_string(), Value::String(book.product_id.clone()));
    extra.insert("reviews_count".to_string(), Value::from(book.reviews_count));
    extra.insert("summary".to_string(), Value::String(book.summary.clone()));
    extra.insert("publisher".to_string(), Value::String(book.publisher.clone()));
    extra.insert("stock".to_string(), Value::from(book.stock));
    NormalizedDocument {
        id: Uuid::new_v4().to_string(),
        text: book.summary.clone(),
        store: StoreTag::StoreB,
        title: book.book_name.clone(),
        author: book.writer.clone(),
        price: book.cost,
        publication_year: book.publication_year,
        isbn: String::new(),
        genre: Some(Genre::Many(book.category.iter().map(|c| c.to_lowercase()).collect())),
        extra,
    }
}

fn json_f64(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}
