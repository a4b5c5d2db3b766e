//! Ollama-style API data models
//!
//! Request bodies for `/api/generate` and `/api/chat` and helpers that read
//! the fields this client cares about out of a response body

use crate::utils::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Extra request fields passed through verbatim (e.g. `temperature`, `options`)
pub type Options = Map<String, Value>;

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role (system, user, assistant)
    pub role: String,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// `/api/generate` request body
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

/// `/api/chat` request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
}

impl<'a> GenerateRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            prompt,
            stream: false,
        }
    }
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, messages: &'a [ChatMessage]) -> Self {
        Self {
            model,
            messages,
            stream: false,
        }
    }
}

/// Serialize a request and merge caller options into it.
///
/// Option keys overwrite fixed fields of the same name.
pub fn build_body<T: Serialize>(request: &T, options: &Options) -> serde_json::Result<Value> {
    let mut body = serde_json::to_value(request)?;
    if let Value::Object(fields) = &mut body {
        for (key, value) in options {
            fields.insert(key.clone(), value.clone());
        }
    }
    Ok(body)
}

/// Text of a `/api/generate` response, empty when absent
pub fn generated_text(body: &Value) -> String {
    body.get("response")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Assistant content of a `/api/chat` response.
///
/// Empty when `message` or its `content` is absent; an error when `message`
/// is present but not an object.
pub fn chat_content(body: &Value) -> ClientResult<String> {
    match body.get("message") {
        None => Ok(String::new()),
        Some(Value::Object(message)) => Ok(message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()),
        Some(other) => Err(ClientError::InvalidResponse(format!(
            "expected `message` to be an object, got {}",
            other
        ))),
    }
}

/// Token counts reported for a single call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the evaluated prompt
    pub prompt_eval_count: u64,
    /// Tokens generated
    pub eval_count: u64,
}

impl TokenUsage {
    /// Read the counters from a response body, treating anything that is
    /// not a non-negative integer as zero
    pub fn from_body(body: &Value) -> Self {
        let count = |key: &str| body.get(key).and_then(whole_count).unwrap_or(0);
        Self {
            prompt_eval_count: count("prompt_eval_count"),
            eval_count: count("eval_count"),
        }
    }
}

/// A non-negative integer count, also accepting whole floats such as `10.0`
pub fn whole_count(value: &Value) -> Option<u64> {
    if let Some(count) = value.as_u64() {
        return Some(count);
    }

    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Some(f as u64),
        _ => None,
    }
}
