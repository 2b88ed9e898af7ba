//! Domain types shared by the normalizer, the engine adapter and the
//! search pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::filter::FilterSpec;

/// Origin tag carried on every indexed document, filterable and used for
/// result attribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreTag {
    StoreA,
    StoreB,
}

/// Genre is heterogeneous in arity across stores by design: one lower-cased
/// string for store A, a lower-cased list for store B. Consumers must treat
/// it as "one or many lower-case strings".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Genre {
    One(String),
    Many(Vec<String>),
}

/// Raw record shape exported by store A. Serde enforces the required-field
/// constraint at parse time; a missing field rejects the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreABook {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: f64,
    pub rating: f64,
    pub description: String,
    #[serde(default)]
    pub isbn: String,
    pub publication_year: i32,
}

/// Raw record shape exported by store B.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreBBook {
    pub product_id: String,
    pub book_name: String,
    pub writer: String,
    pub category: Vec<String>,
    pub cost: f64,
    pub reviews_count: i64,
    pub summary: String,
    #[serde(default)]
    pub publisher: String,
    pub stock: i64,
    #[serde(default = "default_publication_year")]
    pub publication_year: i32,
}

pub(crate) fn default_publication_year() -> i32 {
    2020
}

/// The single post-ingestion record shape. Required fields are checked at
/// construction; store-specific extras live in the flattened side map and
/// are never used in cross-store filters.
///
/// Immutable once indexed, except via full reindex (delete + recreate).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedDocument {
    pub id: String,
    /// The field chosen for embedding: description for A, summary for B.
    pub text: String,
    pub store: StoreTag,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub publication_year: i32,
    #[serde(default)]
    pub isbn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<Genre>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NormalizedDocument {
    /// The engine payload: every field except `id`, which becomes the
    /// point id instead.
    pub fn payload(&self) -> anyhow::Result<Map<String, Value>> {
        let value = serde_json::to_value(self)?;
        let mut map = match value {
            Value::Object(map) => map,
            other => anyhow::bail!("document serialized to non-object: {other}"),
        };
        map.remove("id");
        Ok(map)
    }

    /// Rebuild a document from an engine point. Fails on payloads that do
    /// not carry the required normalized fields.
    pub fn from_payload(id: &str, payload: Map<String, Value>) -> anyhow::Result<Self> {
        let mut map = payload;
        map.insert("id".to_string(), Value::String(id.to_string()));
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

/// One point as upserted into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Map<String, Value>,
}

/// One similarity hit. `score` is the engine's cosine similarity, higher is
/// better. Scroll pages reuse this shape with a zero score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

/// One scroll page plus the opaque continuation cursor; `None` means the
/// scan is exhausted.
#[derive(Debug, Clone)]
pub struct ScrollPage {
    pub points: Vec<ScoredPoint>,
    pub next_cursor: Option<Value>,
}

/// The uniform result shape returned by the search pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub filters_applied: FilterSpec,
    pub total_results: usize,
    pub results: Vec<SearchItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchItem {
    pub score: f32,
    pub store: String,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub text_snippet: String,
    /// Remaining payload fields, excluding the five promoted ones.
    pub metadata: Map<String, Value>,
}
