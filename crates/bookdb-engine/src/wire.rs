//! Request/response bodies for the Qdrant REST endpoints we use.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bookdb_core::filter::NativeFilter;
use bookdb_core::types::{Point, ScoredPoint};

#[derive(Debug, Serialize)]
pub struct CreateCollectionRequest {
    pub vectors: VectorParams,
}

#[derive(Debug, Serialize)]
pub struct VectorParams {
    pub size: usize,
    pub distance: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UpsertRequest {
    pub points: Vec<Point>,
}

#[derive(Debug, Serialize)]
pub struct QueryRequest {
    pub query: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<NativeFilter>,
    pub limit: usize,
    pub with_payload: bool,
    pub params: SearchParams,
}

#[derive(Debug, Serialize)]
pub struct SearchParams {
    pub hnsw_ef: usize,
    pub exact: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub result: QueryResult,
}

#[derive(Debug, Deserialize)]
pub struct QueryResult {
    pub points: Vec<ScoredPoint>,
}

#[derive(Debug, Serialize)]
pub struct ScrollRequest {
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<Value>,
    pub with_payload: bool,
}

#[derive(Debug, Deserialize)]
pub struct ScrollResponse {
    pub result: ScrollResult,
}

#[derive(Debug, Deserialize)]
pub struct ScrollResult {
    pub points: Vec<ScoredPoint>,
    #[serde(default)]
    pub next_page_offset: Option<Value>,
}
