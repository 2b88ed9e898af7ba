use thiserror::Error;

/// The two error categories that surface to callers. Translation,
/// compilation, search and scan failures are all recovered locally and
/// logged instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A source batch carried a record missing a required field. Indexing an
    /// incomplete record would corrupt the normalized store, so the whole
    /// batch is rejected.
    #[error("Schema validation failed: {0}")]
    Schema(String),

    /// The embedding capability failed. There is no fallback for a missing
    /// query vector, so this aborts the search call.
    #[error("Embedding failed: {0}")]
    Embedding(String),
}

pub type Result<T> = std::result::Result<T, Error>;
