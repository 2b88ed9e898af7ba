//! Capability seams. The vector engine, the embedding model and the
//! completion model are independent external services; everything above
//! them depends only on these traits.

use serde_json::Value;

use crate::filter::NativeFilter;
use crate::types::{Point, ScoredPoint, ScrollPage};

/// Text embedding capability. `dim` must match the collection's configured
/// vector size; a mismatch is a configuration error, not handled at runtime.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// The vector engine, specified at its wire boundary. Distance metric is
/// fixed to cosine similarity.
pub trait VectorEngine: Send + Sync {
    fn create_collection(&self, collection: &str, vector_size: usize) -> anyhow::Result<()>;
    fn delete_collection(&self, collection: &str) -> anyhow::Result<()>;
    fn collection_exists(&self, collection: &str) -> anyhow::Result<bool>;
    fn upsert(&self, collection: &str, points: Vec<Point>) -> anyhow::Result<()>;
    /// Filtered ANN search: `hnsw_ef` is the accuracy/speed knob, exact
    /// brute force is never requested.
    fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&NativeFilter>,
        limit: usize,
        hnsw_ef: usize,
    ) -> anyhow::Result<Vec<ScoredPoint>>;
    /// One page of a full-collection scan; `cursor` is the opaque
    /// continuation token from the previous page.
    fn scroll(
        &self,
        collection: &str,
        cursor: Option<&Value>,
        limit: usize,
    ) -> anyhow::Result<ScrollPage>;
}

/// Engines are stateless handles; an `Arc` shares one between the ingest
/// and search pipelines.
impl<T: VectorEngine + ?Sized> VectorEngine for std::sync::Arc<T> {
    fn create_collection(&self, collection: &str, vector_size: usize) -> anyhow::Result<()> {
        (**self).create_collection(collection, vector_size)
    }
    fn delete_collection(&self, collection: &str) -> anyhow::Result<()> {
        (**self).delete_collection(collection)
    }
    fn collection_exists(&self, collection: &str) -> anyhow::Result<bool> {
        (**self).collection_exists(collection)
    }
    fn upsert(&self, collection: &str, points: Vec<Point>) -> anyhow::Result<()> {
        (**self).upsert(collection, points)
    }
    fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&NativeFilter>,
        limit: usize,
        hnsw_ef: usize,
    ) -> anyhow::Result<Vec<ScoredPoint>> {
        (**self).search(collection, vector, filter, limit, hnsw_ef)
    }
    fn scroll(
        &self,
        collection: &str,
        cursor: Option<&Value>,
        limit: usize,
    ) -> anyhow::Result<ScrollPage> {
        (**self).scroll(collection, cursor, limit)
    }
}

/// Chat-style text completion capability used for filter generation.
pub trait Completer: Send + Sync {
    fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> anyhow::Result<String>;
}
