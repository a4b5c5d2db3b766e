//! Logging utilities
//!
//! Shared logging configuration and helper functions

use crate::config::settings::LoggingConfig;
use crate::models::ollama::ChatMessage;
use anyhow::Result;
use tracing::info;

/// Initialize logging system
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    config.validate()?;

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(tracing_subscriber::fmt()
            .with_env_filter(config.level.as_str())
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .finish())
    } else {
        // Human readable format (development environment)
        Box::new(tracing_subscriber::fmt()
            .with_env_filter(config.level.as_str())
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .finish())
    };

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    info!("Logging system initialized");
    Ok(())
}

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }

    let kept: String = s.chars().take(max_len).collect();
    format!("{}... ({} chars truncated)", kept, s.chars().count() - max_len)
}

/// Create a filtered summary of chat messages for logging
pub fn summarize_messages(messages: &[ChatMessage]) -> serde_json::Value {
    let filtered: Vec<serde_json::Value> = messages
        .iter()
        .map(|msg| {
            // For system messages, truncate more aggressively
            let max_len = if msg.role == "system" { 100 } else { 200 };
            serde_json::json!({
                "role": msg.role,
                "content": truncate_content(&msg.content, max_len),
            })
        })
        .collect();

    serde_json::Value::Array(filtered)
}
