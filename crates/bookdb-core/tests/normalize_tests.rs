use std::collections::HashSet;

use bookdb_core::error::Error;
use bookdb_core::normalize::{normalize, parse_store_a, parse_store_b};
use bookdb_core::types::{Genre, StoreTag};

fn store_a_json() -> &'static str {
    r#"[
        {
            "book_id": "BKA_1000",
            "title": "The Martian",
            "author": "Andy Weir",
            "genre": "Science Fiction",
            "price": 14.99,
            "rating": 4.7,
            "description": "An astronaut stranded on Mars fights to survive.",
            "isbn": "978-0553418026",
            "publication_year": 2011
        }
    ]"#
}

fn store_b_json() -> &'static str {
    r#"[
        {
            "product_id": "PRB_2000",
            "book_name": "Project Hail Mary",
            "writer": "Andy Weir",
            "category": ["Science Fiction", "Space Exploration"],
            "cost": 18.50,
            "reviews_count": 812,
            "summary": "A lone astronaut must save humanity from extinction.",
            "publisher": "Ballantine Books",
            "stock": 42
        }
    ]"#
}

#[test]
fn one_document_per_record_with_unique_ids_and_store_tags() {
    let a = parse_store_a(store_a_json()).expect("store a");
    let b = parse_store_b(store_b_json()).expect("store b");
    let docs = normalize(&a, &b);

    assert_eq!(docs.len(), 2, "one normalized document per input record");

    let ids: HashSet<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids.len(), docs.len(), "ids are unique");

    assert_eq!(docs[0].store, StoreTag::StoreA);
    assert_eq!(docs[1].store, StoreTag::StoreB);
}

#[test]
fn cross_store_fields_are_renamed_and_text_is_copied_verbatim() {
    let a = parse_store_a(store_a_json()).expect("store a");
    let b = parse_store_b(store_b_json()).expect("store b");
    let docs = normalize(&a, &b);

    let doc_a = &docs[0];
    assert_eq!(doc_a.title, "The Martian");
    assert_eq!(doc_a.author, "Andy Weir");
    assert_eq!(doc_a.price, 14.99);
    assert_eq!(doc_a.publication_year, 2011);
    assert_eq!(doc_a.isbn, "978-0553418026");
    assert_eq!(doc_a.text, "An astronaut stranded on Mars fights to survive.");

    let doc_b = &docs[1];
    assert_eq!(doc_b.title, "Project Hail Mary");
    assert_eq!(doc_b.author, "Andy Weir");
    assert_eq!(doc_b.price, 18.50);
    assert_eq!(doc_b.text, "A lone astronaut must save humanity from extinction.");
    assert_eq!(doc_b.isbn, "", "store B has no isbn, defaults to empty");
}

#[test]
fn genre_is_lower_cased_scalar_for_a_and_list_for_b() {
    let a = parse_store_a(store_a_json()).expect("store a");
    let b = parse_store_b(store_b_json()).expect("store b");
    let docs = normalize(&a, &b);

    assert_eq!(docs[0].genre, Some(Genre::One("science fiction".to_string())));
    assert_eq!(
        docs[1].genre,
        Some(Genre::Many(vec![
            "science fiction".to_string(),
            "space exploration".to_string()
        ]))
    );
}

#[test]
fn store_specific_extras_are_retained_verbatim() {
    let a = parse_store_a(store_a_json()).expect("store a");
    let b = parse_store_b(store_b_json()).expect("store b");
    let docs = normalize(&a, &b);

    assert_eq!(docs[0].extra["book_id"], "BKA_1000");
    assert_eq!(docs[0].extra["rating"], 4.7);
    assert_eq!(docs[1].extra["reviews_count"], 812);
    assert_eq!(docs[1].extra["publisher"], "Ballantine Books");
    assert_eq!(docs[1].extra["stock"], 42);
    assert_eq!(docs[1].extra["product_id"], "PRB_2000");
}

#[test]
fn optional_publication_year_defaults_for_store_b() {
    let b = parse_store_b(store_b_json()).expect("store b");
    assert_eq!(b[0].publication_year, 2020);
}

#[test]
fn missing_required_field_rejects_the_whole_batch() {
    // "author" dropped from an otherwise valid record
    let broken = r#"[
        {
            "book_id": "BKA_1001",
            "title": "Nameless",
            "genre": "Mystery",
            "price": 9.99,
            "rating": 3.2,
            "description": "A book with no author.",
            "publication_year": 2001
        }
    ]"#;
    match parse_store_a(broken) {
        Err(Error::Schema(msg)) => assert!(msg.contains("store_a"), "cause names the batch: {msg}"),
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn payload_round_trips_through_the_engine_shape() {
    let a = parse_store_a(store_a_json()).expect("store a");
    let docs = normalize(&a, &[]);
    let doc = &docs[0];

    let payload = doc.payload().expect("payload");
    assert!(!payload.contains_key("id"), "id is the point id, not payload");
    assert_eq!(payload["store"], "store_a");
    assert_eq!(payload["genre"], "science fiction");

    let back = bookdb_core::types::NormalizedDocument::from_payload(&doc.id, payload)
        .expect("from_payload");
    assert_eq!(&back, doc);
}
