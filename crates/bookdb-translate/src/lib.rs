//! Query Translator: natural language in, abstract filter IR out.
//!
//! Translation is best-effort by contract. Any completion failure, timeout
//! or unparseable response degrades to the canonical empty filter; the
//! caller always gets a `FilterSpec`, never an error.

pub mod prompt;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bookdb_core::filter::FilterSpec;
use bookdb_core::traits::Completer;

pub use prompt::{filter_prompt, SYSTEM_PROMPT};

/// Low temperature and a tight output cap bias the model toward terse,
/// deterministic structured output.
pub const TEMPERATURE: f32 = 0.1;
pub const MAX_TOKENS: u32 = 500;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct QueryTranslator {
    completer: Box<dyn Completer>,
}

impl QueryTranslator {
    pub fn new(completer: Box<dyn Completer>) -> Self {
        Self { completer }
    }

    /// Translate a user query into a filter. Infallible: translation
    /// problems degrade to "unfiltered search", logged for operators.
    pub fn translate(&self, query: &str) -> FilterSpec {
        let user_prompt = filter_prompt(query);
        let raw = match self.completer.complete(SYSTEM_PROMPT, &user_prompt, TEMPERATURE, MAX_TOKENS)
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "filter generation failed, falling back to empty filter");
                return FilterSpec::default();
            }
        };
        match parse_filter_response(&raw) {
            Ok(spec) => {
                debug!(conditions = spec.must.len(), "generated filter");
                spec
            }
            Err(e) => {
                warn!(error = %e, raw, "unparseable filter response, falling back to empty filter");
                FilterSpec::default()
            }
        }
    }
}

/// Parse a completion response into the filter IR, tolerating the code
/// fences chat models like to wrap JSON in.
pub fn parse_filter_response(raw: &str) -> Result<FilterSpec> {
    let cleaned = strip_code_fence(raw.trim());
    if cleaned.is_empty() {
        return Err(anyhow!("empty completion response"));
    }
    serde_json::from_str(cleaned).context("completion response is not a valid filter")
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // drop the info string ("json") up to the first newline
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiCompleter {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OpenAiCompleter {
    pub fn new(endpoint: &str, model: &str, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { http, endpoint: endpoint.to_string(), model: model.to_string(), api_key })
    }
}

impl Completer for OpenAiCompleter {
    fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature,
            max_tokens,
        };
        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response: ChatResponse = request
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .context("chat completion request")?
            .json()
            .context("decode chat completion response")?;
        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("chat completion returned no choices"))
    }
}
