use bookdb_core::traits::Embedder;
use bookdb_embed::{FakeEmbedder, HttpEmbedder};
use httpmock::prelude::*;
use serde_json::json;

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(1024);
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 1024, "embedding dim is 1024");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn fake_embedder_separates_unrelated_texts() {
    let embedder = FakeEmbedder::new(256);
    let embs = embedder
        .embed_batch(&[
            "a stranded astronaut grows potatoes on mars".to_string(),
            "a regency romance about manners and marriage".to_string(),
        ])
        .expect("embed_batch");
    let dot: f32 = embs[0].iter().zip(embs[1].iter()).map(|(a, b)| a * b).sum();
    assert!(dot < 0.5, "unrelated texts should not be near-identical (dot={dot})");
}

#[test]
fn http_embedder_posts_batch_and_parses_vectors() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/embeddings")
            .json_body_partial(r#"{"model": "test-embed", "input": ["one", "two"]}"#);
        then.status(200).json_body(json!({
            "data": [
                {"embedding": [1.0, 0.0]},
                {"embedding": [0.0, 1.0]}
            ]
        }));
    });

    let embedder =
        HttpEmbedder::new(&server.url("/v1/embeddings"), "test-embed", 2).expect("embedder");
    let embs = embedder
        .embed_batch(&["one".to_string(), "two".to_string()])
        .expect("embed_batch");

    mock.assert();
    assert_eq!(embs, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[test]
fn http_embedder_rejects_dimension_mismatch() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/embeddings");
        then.status(200).json_body(json!({"data": [{"embedding": [1.0, 0.0, 0.0]}]}));
    });

    let embedder =
        HttpEmbedder::new(&server.url("/v1/embeddings"), "test-embed", 1024).expect("embedder");
    let err = embedder.embed_batch(&["one".to_string()]).expect_err("dim mismatch");
    assert!(err.to_string().contains("vector size"), "{err}");
}

#[test]
fn http_embedder_surfaces_server_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/embeddings");
        then.status(500);
    });

    let embedder =
        HttpEmbedder::new(&server.url("/v1/embeddings"), "test-embed", 2).expect("embedder");
    assert!(embedder.embed_batch(&["one".to_string()]).is_err());
}
