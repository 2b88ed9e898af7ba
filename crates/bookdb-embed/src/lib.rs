//! Embedding capability adapters.
//!
//! `HttpEmbedder` talks to an OpenAI-compatible `/v1/embeddings` endpoint
//! (text-embeddings-inference, Ollama and friends speak the same shape).
//! `FakeEmbedder` is a deterministic hashing embedder for offline runs and
//! tests, selected via `APP_USE_FAKE_EMBEDDINGS`.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use bookdb_core::traits::Embedder;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpEmbedder {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    dim: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(endpoint: &str, model: &str, dim: usize) -> Result<Self> {
        let http = reqwest::blocking::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { http, endpoint: endpoint.to_string(), model: model.to_string(), dim })
    }
}

impl Embedder for HttpEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&EmbedRequest { model: &self.model, input: texts })
            .send()?
            .error_for_status()?;
        let parsed: EmbedResponse = response.json()?;
        if parsed.data.len() != texts.len() {
            return Err(anyhow!(
                "embedding count mismatch: sent {} texts, got {} vectors",
                texts.len(),
                parsed.data.len()
            ));
        }
        let embeddings: Vec<Vec<f32>> = parsed.data.into_iter().map(|d| d.embedding).collect();
        for e in &embeddings {
            if e.len() != self.dim {
                // dimension mismatch against the collection is a
                // configuration error, surface it instead of indexing garbage
                return Err(anyhow!(
                    "embedding dim {} does not match configured vector size {}",
                    e.len(),
                    self.dim
                ));
            }
        }
        debug!(count = embeddings.len(), "embedded batch");
        Ok(embeddings)
    }
}

/// Deterministic hashing embedder: one bucket bump per whitespace token,
/// L2-normalized. Good enough to make cosine search meaningful in tests.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

impl FakeEmbedder {
    fn embed_one(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.to_lowercase().split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

/// Build the configured embedder, honoring the `APP_USE_FAKE_EMBEDDINGS`
/// escape hatch for offline runs.
pub fn get_default_embedder(endpoint: &str, model: &str, dim: usize) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        debug!("using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(dim)));
    }
    Ok(Box::new(HttpEmbedder::new(endpoint, model, dim)?))
}
