//! Process-wide client instance
//!
//! Free functions mirroring [`AiClient::generate`] and [`AiClient::chat`].
//! The instance is either installed explicitly at startup with [`install`]
//! or built from the environment on first use.

use crate::models::{ChatMessage, Options};
use crate::services::client::AiClient;
use crate::utils::error::ClientResult;
use once_cell::sync::OnceCell;

static SHARED: OnceCell<AiClient> = OnceCell::new();

/// Install `client` as the process-wide instance.
///
/// Returns the client back if an instance already exists.
pub fn install(client: AiClient) -> Result<(), AiClient> {
    SHARED.set(client)
}

/// The process-wide instance, built from the environment if none was installed
pub fn shared() -> ClientResult<&'static AiClient> {
    SHARED.get_or_try_init(AiClient::from_env)
}

/// Generate text with the process-wide client
pub async fn generate(prompt: &str, model: Option<&str>, options: &Options) -> ClientResult<String> {
    shared()?.generate(prompt, model, options).await
}

/// Chat with the process-wide client
pub async fn chat(messages: &[ChatMessage], model: Option<&str>, options: &Options) -> ClientResult<String> {
    shared()?.chat(messages, model, options).await
}
