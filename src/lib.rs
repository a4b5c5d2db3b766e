//! Ollama usage client library
//!
//! Minimal client for an Ollama-style text generation service: generate and
//! chat calls with retry on transient failures, plus token usage totals kept
//! in a shared JSON file

pub mod config;
pub mod models;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use models::{ChatMessage, Options, TokenUsage};
pub use services::shared::{chat, generate};
pub use services::{AiClient, RetryConfig, UsageRecorder, UsageTotals};
pub use utils::error::{ClientError, ClientResult};

