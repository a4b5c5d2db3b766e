//! Data models module
//!
//! Defines request and response data structures for the Ollama-style API

pub mod ollama;

pub use ollama::{ChatMessage, Options, TokenUsage};
