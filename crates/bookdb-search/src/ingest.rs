//! One-time/batch ingestion: normalized documents in, indexed points out.
//!
//! Reindex is the only mutation path: delete + recreate the collection,
//! then embed and upsert. Not expected to run concurrently with live
//! querying.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use bookdb_core::traits::{Embedder, VectorEngine};
use bookdb_core::types::{NormalizedDocument, Point};

const EMBED_BATCH: usize = 64;

pub struct IndexPipeline {
    engine: Box<dyn VectorEngine>,
    embedder: Box<dyn Embedder>,
    collection: String,
    vector_size: usize,
}

impl IndexPipeline {
    pub fn new(
        engine: Box<dyn VectorEngine>,
        embedder: Box<dyn Embedder>,
        collection: &str,
        vector_size: usize,
    ) -> Self {
        Self { engine, embedder, collection: collection.to_string(), vector_size }
    }

    /// Drop the collection if present and create it fresh with cosine
    /// distance. Deleting a collection that never existed is tolerated.
    pub fn recreate_collection(&self) -> Result<()> {
        if self.engine.collection_exists(&self.collection).unwrap_or(false) {
            self.engine
                .delete_collection(&self.collection)
                .with_context(|| format!("drop '{}' before reindex", self.collection))?;
            info!(collection = %self.collection, "deleted existing collection");
        }
        self.engine.create_collection(&self.collection, self.vector_size)?;
        info!(collection = %self.collection, vector_size = self.vector_size, "created collection");
        Ok(())
    }

    /// Embed the documents' text fields in batches and upsert them.
    pub fn index(&self, documents: &[NormalizedDocument]) -> Result<()> {
        if documents.is_empty() {
            info!("no documents to index");
            return Ok(());
        }
        let pb = ProgressBar::new(documents.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} documents {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        for batch in documents.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).context("embed batch")?;
            let mut points = Vec::with_capacity(batch.len());
            for (doc, vector) in batch.iter().zip(embeddings) {
                // vector size is fixed at collection creation; a mismatch
                // here is a wiring error, not a data error
                anyhow::ensure!(
                    vector.len() == self.vector_size,
                    "embedding dim {} does not match collection vector size {}",
                    vector.len(),
                    self.vector_size
                );
                points.push(Point { id: doc.id.clone(), vector, payload: doc.payload()? });
            }
            self.engine.upsert(&self.collection, points)?;
            pb.inc(batch.len() as u64);
        }
        pb.finish_with_message("indexed");
        info!(count = documents.len(), collection = %self.collection, "indexing complete");
        Ok(())
    }
}
