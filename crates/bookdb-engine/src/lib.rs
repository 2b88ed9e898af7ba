//! Qdrant REST adapter implementing the `VectorEngine` trait.
//!
//! Thin blocking HTTP client over the collection and points endpoints; all
//! request/response bodies are typed in [`wire`]. Retrieval semantics
//! (fallbacks, pagination loops) live in the search pipeline, not here.

pub mod wire;

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use bookdb_core::filter::NativeFilter;
use bookdb_core::traits::VectorEngine;
use bookdb_core::types::{Point, ScoredPoint, ScrollPage};

use wire::{
    CreateCollectionRequest, QueryRequest, QueryResponse, ScrollRequest, ScrollResponse,
    SearchParams, UpsertRequest, VectorParams,
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct QdrantEngine {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl QdrantEngine {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let http = reqwest::blocking::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { http, base_url: format!("http://{host}:{port}") })
    }

    /// For tests and non-default deployments: a full base URL instead of
    /// host/port.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{collection}", self.base_url)
    }
}

impl VectorEngine for QdrantEngine {
    fn create_collection(&self, collection: &str, vector_size: usize) -> Result<()> {
        let body = CreateCollectionRequest {
            vectors: VectorParams { size: vector_size, distance: "Cosine" },
        };
        self.http
            .put(self.collection_url(collection))
            .json(&body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("create collection '{collection}'"))?;
        debug!(collection, vector_size, "created collection");
        Ok(())
    }

    fn delete_collection(&self, collection: &str) -> Result<()> {
        self.http
            .delete(self.collection_url(collection))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("delete collection '{collection}'"))?;
        debug!(collection, "deleted collection");
        Ok(())
    }

    fn collection_exists(&self, collection: &str) -> Result<bool> {
        let response = self
            .http
            .get(self.collection_url(collection))
            .send()
            .with_context(|| format!("probe collection '{collection}'"))?;
        Ok(response.status().is_success())
    }

    fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<()> {
        let count = points.len();
        self.http
            .put(format!("{}/points?wait=true", self.collection_url(collection)))
            .json(&UpsertRequest { points })
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("upsert into '{collection}'"))?;
        debug!(collection, count, "upserted points");
        Ok(())
    }

    fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&NativeFilter>,
        limit: usize,
        hnsw_ef: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let body = QueryRequest {
            query: vector.to_vec(),
            filter: filter.cloned(),
            limit,
            with_payload: true,
            params: SearchParams { hnsw_ef, exact: false },
        };
        let response: QueryResponse = self
            .http
            .post(format!("{}/points/query", self.collection_url(collection)))
            .json(&body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("query '{collection}'"))?
            .json()
            .context("decode query response")?;
        Ok(response.result.points)
    }

    fn scroll(
        &self,
        collection: &str,
        cursor: Option<&Value>,
        limit: usize,
    ) -> Result<ScrollPage> {
        let body = ScrollRequest { limit, offset: cursor.cloned(), with_payload: true };
        let response: ScrollResponse = self
            .http
            .post(format!("{}/points/scroll", self.collection_url(collection)))
            .json(&body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("scroll '{collection}'"))?
            .json()
            .context("decode scroll response")?;
        Ok(ScrollPage {
            points: response.result.points,
            next_cursor: response.result.next_page_offset,
        })
    }
}
