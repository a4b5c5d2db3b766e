//! HTTP client service
//!
//! Encapsulates HTTP communication with the remote text generation service

use crate::config::Settings;
use crate::models::ollama::{self, ChatMessage, ChatRequest, GenerateRequest, Options};
use crate::services::usage::UsageRecorder;
use crate::utils::error::{ClientError, ClientResult};
use crate::utils::logging::{summarize_messages, truncate_content};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

const GENERATE_PATH: &str = "/api/generate";
const CHAT_PATH: &str = "/api/chat";

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum retry attempts after the first request
    pub max_retries: u32,
    /// Base delay time (milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay time (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 120_000,
        }
    }
}

impl RetryConfig {
    /// Backoff before retry number `attempt` (0-based): 1s, 2s, 4s, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt);
        let delay = std::cmp::min(self.base_delay_ms.saturating_mul(factor), self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Outcome of a single HTTP exchange
enum Attempt {
    Done(Value),
    Retry { error: ClientError, retry_after: Option<Duration> },
}

/// Client for an Ollama-style generation service
#[derive(Debug, Clone)]
pub struct AiClient {
    client: Client,
    settings: Settings,
    retry_config: RetryConfig,
    usage: UsageRecorder,
}

impl AiClient {
    /// Create a new client instance with the default retry policy
    pub fn new(settings: Settings) -> ClientResult<Self> {
        Self::with_retry(settings, RetryConfig::default())
    }

    /// Create a client with a custom retry policy
    pub fn with_retry(settings: Settings, retry_config: RetryConfig) -> ClientResult<Self> {
        let mut builder = Client::builder().user_agent(concat!("ollama-usage-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let usage = UsageRecorder::new(settings.usage.stats_path());

        Ok(Self {
            client,
            settings,
            retry_config,
            usage,
        })
    }

    /// Create a client from environment configuration
    pub fn from_env() -> ClientResult<Self> {
        Self::new(Settings::new()?)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn usage(&self) -> &UsageRecorder {
        &self.usage
    }

    /// Generate text for a prompt via `/api/generate`
    pub async fn generate(&self, prompt: &str, model: Option<&str>, options: &Options) -> ClientResult<String> {
        let result = self.try_generate(prompt, model, options).await;
        if let Err(e) = &result {
            error!(error_type = e.error_type(), "AI generation error: {}", e);
        }
        result
    }

    /// Chat with the model using messages format via `/api/chat`
    pub async fn chat(&self, messages: &[ChatMessage], model: Option<&str>, options: &Options) -> ClientResult<String> {
        let result = self.try_chat(messages, model, options).await;
        if let Err(e) = &result {
            error!(error_type = e.error_type(), "AI chat error: {}", e);
        }
        result
    }

    async fn try_generate(&self, prompt: &str, model: Option<&str>, options: &Options) -> ClientResult<String> {
        if prompt.is_empty() {
            return Err(ClientError::Validation("prompt cannot be empty".to_string()));
        }

        let model = self.settings.resolve_model(model);
        debug!("Sending generate request: model={}, prompt={}", model, truncate_content(prompt, 200));

        let body = ollama::build_body(&GenerateRequest::new(&model, prompt), options)?;
        let data = self.post_with_retry(GENERATE_PATH, &body).await?;
        self.usage.record(&data).await;

        Ok(ollama::generated_text(&data))
    }

    async fn try_chat(&self, messages: &[ChatMessage], model: Option<&str>, options: &Options) -> ClientResult<String> {
        if messages.is_empty() {
            return Err(ClientError::Validation("messages cannot be empty".to_string()));
        }

        let model = self.settings.resolve_model(model);
        debug!("Sending chat request: model={}, messages={}", model, summarize_messages(messages));

        let body = ollama::build_body(&ChatRequest::new(&model, messages), options)?;
        let data = self.post_with_retry(CHAT_PATH, &body).await?;
        self.usage.record(&data).await;

        ollama::chat_content(&data)
    }

    /// POST a JSON body, retrying transient failures with exponential backoff
    async fn post_with_retry(&self, path: &str, body: &Value) -> ClientResult<Value> {
        let url = self.settings.api_url(path);
        let max_retries = self.retry_config.max_retries;

        let mut attempt = 0;
        loop {
            let (error, retry_after) = match self.post_once(&url, body).await? {
                Attempt::Done(data) => return Ok(data),
                Attempt::Retry { error, retry_after } => (error, retry_after),
            };

            if attempt >= max_retries {
                return Err(ClientError::RetriesExhausted {
                    attempts: attempt + 1,
                    last: Box::new(error),
                });
            }

            let delay = retry_after.unwrap_or_else(|| self.retry_config.backoff(attempt));
            warn!(
                "Request to {} failed ({}), retrying after {}ms (attempt {}/{})",
                url,
                error,
                delay.as_millis(),
                attempt + 1,
                max_retries
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Send one request. Non-retryable failures are returned as `Err`.
    async fn post_once(&self, url: &str, body: &Value) -> ClientResult<Attempt> {
        let response = match self.client.post(url).json(body).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = ClientError::HttpClient(e);
                return if error.is_transient() {
                    Ok(Attempt::Retry { error, retry_after: None })
                } else {
                    Err(error)
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            let text = response.text().await?;
            let data: Value = serde_json::from_str(&text)?;
            if !data.is_object() {
                return Err(ClientError::InvalidResponse(format!(
                    "expected a JSON object, got {}",
                    truncate_content(&data.to_string(), 100)
                )));
            }
            debug!("Request to {} completed successfully", url);
            return Ok(Attempt::Done(data));
        }

        let retry_after = parse_retry_after(&response);
        let error_text = response.text().await.unwrap_or_default();
        let error = ClientError::Status {
            status,
            body: error_text,
        };

        if error.is_transient() {
            Ok(Attempt::Retry { error, retry_after })
        } else {
            Err(error)
        }
    }
}

/// Numeric `Retry-After` header, honored for 429 and 503 responses
fn parse_retry_after(response: &Response) -> Option<Duration> {
    if !matches!(response.status(), StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE) {
        return None;
    }

    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
