//! Command line front end
//!
//! Sends a single generate or chat request to the configured service and
//! prints the reply, or prints the accumulated usage totals

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ollama_usage_client::services::shared;
use ollama_usage_client::utils::logging::init_logging;
use ollama_usage_client::{AiClient, ChatMessage, Options, Settings};
use serde_json::Value;
use tracing::info;

// CLI argument structure
#[derive(Parser, Debug)]
#[command(name = "llm-client")]
#[command(about = "Send prompts to an Ollama-style service and track token usage")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate text from a single prompt
    Generate {
        /// Prompt text
        prompt: String,

        /// Model to use instead of LLM_MODEL
        #[arg(short, long)]
        model: Option<String>,

        /// Extra request field, e.g. temperature=0.2 (repeatable)
        #[arg(short, long = "option", value_parser = parse_option)]
        options: Vec<(String, Value)>,
    },
    /// Send a conversation to the chat endpoint
    Chat {
        /// Message as role:content (repeatable, in order)
        #[arg(long = "message", required = true, value_parser = parse_message)]
        messages: Vec<ChatMessage>,

        /// Model to use instead of LLM_MODEL
        #[arg(short, long)]
        model: Option<String>,

        /// Extra request field, e.g. temperature=0.2 (repeatable)
        #[arg(short, long = "option", value_parser = parse_option)]
        options: Vec<(String, Value)>,
    },
    /// Print the accumulated token usage totals
    Usage,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::new().context("Failed to load client settings")?;
    init_logging(&settings.logging)?;

    let client = AiClient::new(settings).context("Failed to create AI client")?;
    info!("Using AI endpoint {}", client.settings().service.endpoint);
    if shared::install(client).is_err() {
        anyhow::bail!("AI client already initialized");
    }

    match args.command {
        Command::Generate { prompt, model, options } => {
            let options: Options = options.into_iter().collect();
            let text = shared::generate(&prompt, model.as_deref(), &options).await?;
            println!("{}", text);
        }
        Command::Chat { messages, model, options } => {
            let options: Options = options.into_iter().collect();
            let text = shared::chat(&messages, model.as_deref(), &options).await?;
            println!("{}", text);
        }
        Command::Usage => {
            let totals = shared::shared()?.usage().totals().await;
            println!("{}", serde_json::to_string_pretty(&totals)?);
        }
    }

    Ok(())
}

/// Parse `key=value`; the value is read as JSON and falls back to a plain string
fn parse_option(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("empty option name in '{}'", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Parse `role:content`
fn parse_message(raw: &str) -> Result<ChatMessage, String> {
    let (role, content) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected role:content, got '{}'", raw))?;
    Ok(ChatMessage::new(role.trim(), content))
}
