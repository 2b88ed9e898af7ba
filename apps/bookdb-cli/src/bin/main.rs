use std::env;
use std::fs;
use std::sync::Arc;

use bookdb_core::config::Config;
use bookdb_core::normalize::{normalize, parse_store_a, parse_store_b};
use bookdb_core::traits::{Completer, Embedder, VectorEngine};
use bookdb_embed::get_default_embedder;
use bookdb_engine::QdrantEngine;
use bookdb_search::ingest::IndexPipeline;
use bookdb_search::SearchPipeline;
use bookdb_translate::{OpenAiCompleter, QueryTranslator};

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <ingest|search|books> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn build_engine(config: &Config) -> anyhow::Result<Arc<dyn VectorEngine>> {
    let host: String = config.get_or("engine.host", "localhost".to_string());
    let port: u16 = config.get_or("engine.port", 6333);
    Ok(Arc::new(QdrantEngine::new(&host, port)?))
}

fn build_embedder(config: &Config) -> anyhow::Result<Box<dyn Embedder>> {
    let endpoint: String =
        config.get_or("embedding.endpoint", "http://localhost:8080/v1/embeddings".to_string());
    let model: String = config.get_or("embedding.model", "Qwen/Qwen3-Embedding-0.6B".to_string());
    let dim: usize = config.get_or("engine.vector_size", 1024);
    get_default_embedder(&endpoint, &model, dim)
}

fn build_translator(config: &Config) -> anyhow::Result<QueryTranslator> {
    let endpoint: String = config
        .get_or("completion.endpoint", "https://api.openai.com/v1/chat/completions".to_string());
    let model: String = config.get_or("completion.model", "gpt-4o".to_string());
    let api_key = env::var("OPENAI_API_KEY").ok();
    let completer: Box<dyn Completer> = Box::new(OpenAiCompleter::new(&endpoint, &model, api_key)?);
    Ok(QueryTranslator::new(completer))
}

fn search_pipeline(config: &Config) -> anyhow::Result<SearchPipeline> {
    let collection: String = config.get_or("engine.collection", "bookstore_collection".to_string());
    let hnsw_ef: usize = config.get_or("engine.hnsw_ef", bookdb_search::DEFAULT_HNSW_EF);
    Ok(SearchPipeline::new(
        Box::new(build_engine(config)?),
        build_embedder(config)?,
        build_translator(config)?,
        &collection,
    )
    .with_hnsw_ef(hnsw_ef))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "ingest" => {
            let store_a_path = args
                .first()
                .cloned()
                .unwrap_or_else(|| config.get_or("data.store_a", "data/store_a_books.json".to_string()));
            let store_b_path = args
                .get(1)
                .cloned()
                .unwrap_or_else(|| config.get_or("data.store_b", "data/store_b_books.json".to_string()));

            let store_a = parse_store_a(&fs::read_to_string(&store_a_path)?)?;
            let store_b = parse_store_b(&fs::read_to_string(&store_b_path)?)?;
            let documents = normalize(&store_a, &store_b);
            println!(
                "Normalized {} documents ({} store A, {} store B)",
                documents.len(),
                store_a.len(),
                store_b.len()
            );

            let collection: String =
                config.get_or("engine.collection", "bookstore_collection".to_string());
            let vector_size: usize = config.get_or("engine.vector_size", 1024);
            let pipeline = IndexPipeline::new(
                Box::new(build_engine(&config)?),
                build_embedder(&config)?,
                &collection,
                vector_size,
            );
            pipeline.recreate_collection()?;
            pipeline.index(&documents)?;
            println!("✅ Ingest complete ({} documents)", documents.len());
        }
        "search" => {
            let query = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: bookdb search \"<query>\" [limit]");
                std::process::exit(1)
            });
            let limit: usize = args
                .get(1)
                .and_then(|s| s.parse().ok())
                .unwrap_or(bookdb_search::DEFAULT_LIMIT);

            let pipeline = search_pipeline(&config)?;
            let response = pipeline.search(&query, limit)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        "books" => {
            let page_size: usize = config.get_or("engine.scroll_page_size", 1000);
            let pipeline = search_pipeline(&config)?;
            let books = pipeline.scroll_all(page_size);
            println!("{}", serde_json::to_string_pretty(&books)?);
            eprintln!("{} books", books.len());
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}
