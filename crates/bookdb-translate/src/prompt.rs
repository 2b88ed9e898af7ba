//! Prompt construction for the filter-generation completion call.
//!
//! The schema description and the rule list are the prompt-level half of a
//! defense-in-depth pair: the compiler's allow-list check is the actual
//! enforcement point for anything the model emits.

use serde_json::{json, Value};

pub const SYSTEM_PROMPT: &str = "You are a database query expert. Return only valid JSON.";

/// The normalized schema as shown to the completion model: field names,
/// types and the filterable-field allow-list.
pub fn normalized_schema() -> Value {
    json!({
        "fields": [
            "title", "author", "price", "genre", "publication_year",
            "rating", "reviews_count", "store"
        ],
        "field_types": {
            "title": "string",
            "author": "string",
            "price": "float",
            "genre": "string or array of strings",
            "publication_year": "integer",
            "rating": "float",
            "reviews_count": "integer",
            "store": "string"
        },
        "filterable_fields": bookdb_core::filter::FILTERABLE_FIELDS
    })
}

/// Build the user prompt embedding the schema, the query, worked examples
/// of the expected filter JSON and the rule list.
pub fn filter_prompt(user_query: &str) -> String {
    let schema_info =
        serde_json::to_string_pretty(&normalized_schema()).unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"
You are an expert at converting natural language queries into vector database filters.

Here is the normalized schema of the data in the vector store:
{schema_info}

USER QUERY: "{user_query}"

Based on the user's query and the schema, generate a filter. Return ONLY the valid JSON.

FILTER FORMAT EXAMPLES:
1. Price filter: {{"must": [{{"key": "price", "range": {{"gte": 10, "lte": 20}}}}]}}
2. Author filter: {{"must": [{{"key": "author", "match": {{"value": "Stephen King"}}}}]}}
3. Genre filter: {{"must": [{{"key": "genre", "match": {{"value": "Science Fiction"}}}}]}}
4. Multiple filters: {{"must": [{{"key": "author", "match": {{"value": "Andy Weir"}}}}, {{"key": "price", "range": {{"lte": 20}}}}]}}

RULES:
1. ONLY use the fields available in the `filterable_fields` list from the schema.
2. Do NOT invent fields. Do NOT use fields like 'category'. The only field for book category is 'genre'.
3. For genre queries, create a filter for the 'genre' field.
4. For price comparisons (e.g., 'cheaper', 'expensive'), create appropriate ranges for the 'price' field.
5. For popularity queries (e.g., 'popular', 'highly-rated'), use 'rating' > 4.0 or 'reviews_count' > 500.

If no specific filters are needed for the query, return: {{"must": []}}
"#
    )
}
