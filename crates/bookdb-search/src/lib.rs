//! Search orchestration: query in, ranked normalized results out.
//!
//! The pipeline wires the translator, the filter compiler, the embedder and
//! the vector engine together and owns the fallback policy: translation and
//! compilation problems widen the search, engine failures read as "no
//! matches", and only a missing query vector aborts the call.

pub mod ingest;

use anyhow::Result;
use serde_json::{Map, Value};
use tracing::warn;

use bookdb_core::error::Error;
use bookdb_core::filter::compile;
use bookdb_core::traits::{Embedder, VectorEngine};
use bookdb_core::types::{NormalizedDocument, ScoredPoint, SearchItem, SearchResponse};
use bookdb_translate::QueryTranslator;

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_HNSW_EF: usize = 128;
const SNIPPET_CHARS: usize = 200;

pub struct SearchPipeline {
    engine: Box<dyn VectorEngine>,
    embedder: Box<dyn Embedder>,
    translator: QueryTranslator,
    collection: String,
    hnsw_ef: usize,
}

impl SearchPipeline {
    pub fn new(
        engine: Box<dyn VectorEngine>,
        embedder: Box<dyn Embedder>,
        translator: QueryTranslator,
        collection: &str,
    ) -> Self {
        Self {
            engine,
            embedder,
            translator,
            collection: collection.to_string(),
            hnsw_ef: DEFAULT_HNSW_EF,
        }
    }

    pub fn with_hnsw_ef(mut self, hnsw_ef: usize) -> Self {
        self.hnsw_ef = hnsw_ef;
        self
    }

    /// Run the full hybrid search: translated filter ANDed with similarity
    /// over the query embedding, `limit` nearest neighbors.
    ///
    /// Fails only when the embedding capability does; an engine failure
    /// returns an empty result set instead.
    pub fn search(&self, query: &str, limit: usize) -> Result<SearchResponse> {
        // Filter translation and embedding both depend only on the query
        // text, so they run concurrently; the engine call needs both.
        let (spec, embedded) = std::thread::scope(|scope| {
            let translation = scope.spawn(|| self.translator.translate(query));
            let embedded = self.embedder.embed_batch(&[query.to_string()]);
            (translation.join().unwrap_or_default(), embedded)
        });

        let vector = embedded
            .map_err(|e| Error::Embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("embedder returned no vector".to_string()))?;

        let native = compile(&spec);
        let hits = match self.engine.search(
            &self.collection,
            &vector,
            native.as_ref(),
            limit,
            self.hnsw_ef,
        ) {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "vector engine search failed, returning no matches");
                Vec::new()
            }
        };

        Ok(SearchResponse {
            query: query.to_string(),
            filters_applied: spec,
            total_results: hits.len(),
            results: hits.into_iter().map(format_hit).collect(),
        })
    }

    /// Cursor-paginated full-collection scan for analytics consumers.
    ///
    /// A mid-scan engine failure abandons pagination and returns whatever
    /// accumulated so far; it is logged, not retried.
    pub fn scroll_all(&self, page_size: usize) -> Vec<NormalizedDocument> {
        let mut documents = Vec::new();
        let mut cursor: Option<Value> = None;
        loop {
            let page = match self.engine.scroll(&self.collection, cursor.as_ref(), page_size) {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, accumulated = documents.len(), "scroll failed, returning partial scan");
                    break;
                }
            };
            for point in page.points {
                match NormalizedDocument::from_payload(&point.id, point.payload) {
                    Ok(doc) => documents.push(doc),
                    Err(e) => warn!(id = %point.id, error = %e, "skipping malformed payload"),
                }
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        documents
    }
}

fn format_hit(hit: ScoredPoint) -> SearchItem {
    let mut payload = hit.payload;
    let text = take_string(&mut payload, "text");
    SearchItem {
        score: round4(hit.score),
        store: take_string(&mut payload, "store"),
        title: take_string(&mut payload, "title"),
        author: take_string(&mut payload, "author"),
        price: payload.remove("price").and_then(|v| v.as_f64()).unwrap_or(0.0),
        text_snippet: snippet(&text),
        metadata: payload,
    }
}

fn take_string(payload: &mut Map<String, Value>, key: &str) -> String {
    match payload.remove(key) {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Truncate to 200 characters with an ellipsis marker; shorter text passes
/// through unchanged. Char-based so multi-byte text cannot split.
fn snippet(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(SNIPPET_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

fn round4(score: f32) -> f32 {
    (score * 10_000.0).round() / 10_000.0
}
