use anyhow::anyhow;
use bookdb_core::filter::{ConditionSpec, FilterSpec, RangeSpec};
use bookdb_core::traits::Completer;
use bookdb_translate::{
    filter_prompt, parse_filter_response, OpenAiCompleter, QueryTranslator, MAX_TOKENS,
    SYSTEM_PROMPT, TEMPERATURE,
};
use httpmock::prelude::*;
use serde_json::json;

/// Completer that returns a canned response, recording nothing.
struct StaticCompleter(&'static str);

impl Completer for StaticCompleter {
    fn complete(&self, _: &str, _: &str, _: f32, _: u32) -> anyhow::Result<String> {
        Ok(self.0.to_string())
    }
}

/// Completer that always fails, standing in for an outage or timeout.
struct FailingCompleter;

impl Completer for FailingCompleter {
    fn complete(&self, _: &str, _: &str, _: f32, _: u32) -> anyhow::Result<String> {
        Err(anyhow!("completion capability unavailable"))
    }
}

#[test]
fn translates_a_well_formed_response() {
    let translator = QueryTranslator::new(Box::new(StaticCompleter(
        r#"{"must": [{"key": "price", "range": {"lte": 15.0}}]}"#,
    )));
    let spec = translator.translate("highly rated books under $15");
    assert_eq!(
        spec.must,
        vec![ConditionSpec::range("price", RangeSpec { lte: Some(15.0), ..RangeSpec::default() })]
    );
}

#[test]
fn strips_code_fences_before_parsing() {
    let fenced = "```json\n{\"must\": [{\"key\": \"author\", \"match\": {\"value\": \"Andy Weir\"}}]}\n```";
    let translator = QueryTranslator::new(Box::new(StaticCompleter(
        "```json\n{\"must\": [{\"key\": \"author\", \"match\": {\"value\": \"Andy Weir\"}}]}\n```",
    )));
    let spec = translator.translate("books by Andy Weir");
    assert_eq!(spec.must, vec![ConditionSpec::match_value("author", "Andy Weir")]);

    let parsed = parse_filter_response(fenced).expect("fenced parse");
    assert_eq!(parsed.must.len(), 1);
}

#[test]
fn malformed_response_degrades_to_the_empty_filter() {
    for raw in ["not json at all", "", "{\"must\": \"oops\"}", "```\n\n```"] {
        let translator = QueryTranslator::new(Box::new(StaticCompleter(raw)));
        let spec = translator.translate("anything");
        assert_eq!(spec, FilterSpec::default(), "raw: {raw:?}");
    }
}

#[test]
fn completion_failure_degrades_to_the_empty_filter() {
    let translator = QueryTranslator::new(Box::new(FailingCompleter));
    assert_eq!(translator.translate("anything"), FilterSpec::default());
}

#[test]
fn no_filter_response_parses_to_the_empty_filter() {
    let spec = parse_filter_response(r#"{"must": []}"#).expect("parse");
    assert!(spec.is_empty());
}

#[test]
fn prompt_embeds_schema_query_and_rules() {
    let prompt = filter_prompt("cheap horror books");
    assert!(prompt.contains("cheap horror books"));
    assert!(prompt.contains("filterable_fields"));
    assert!(prompt.contains("reviews_count"));
    // the known-wrong source field is explicitly forbidden
    assert!(prompt.contains("Do NOT use fields like 'category'"));
    assert!(prompt.contains(r#"return: {"must": []}"#));
}

#[test]
fn openai_completer_sends_both_messages_and_reads_the_first_choice() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer test-key")
            .json_body_partial(
                r#"{
                    "model": "gpt-4o",
                    "messages": [
                        {"role": "system", "content": "You are a database query expert. Return only valid JSON."}
                    ],
                    "temperature": 0.1,
                    "max_tokens": 500
                }"#,
            );
        then.status(200).json_body(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"must\": []}"}}]
        }));
    });

    let completer = OpenAiCompleter::new(
        &server.url("/v1/chat/completions"),
        "gpt-4o",
        Some("test-key".to_string()),
    )
    .expect("completer");
    let raw = completer
        .complete(SYSTEM_PROMPT, &filter_prompt("hi"), TEMPERATURE, MAX_TOKENS)
        .expect("complete");

    mock.assert();
    assert_eq!(raw, "{\"must\": []}");
}

#[test]
fn openai_completer_surfaces_http_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(429);
    });

    let completer =
        OpenAiCompleter::new(&server.url("/v1/chat/completions"), "gpt-4o", None).expect("completer");
    assert!(completer.complete("s", "u", 0.1, 100).is_err());
}
