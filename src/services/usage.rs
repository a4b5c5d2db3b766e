//! Token usage accounting
//!
//! Keeps running totals of token counters in a small JSON file so an
//! external consumer can pick them up. The file is read, merged and
//! rewritten on every call without locking: concurrent writers (threads or
//! processes) can lose each other's updates.

use crate::models::ollama::whole_count;
use crate::models::TokenUsage;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persisted usage totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub prompt_eval_count: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub eval_count: u64,
    /// Fields written by other tools, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UsageTotals {
    /// Add one call's counters
    pub fn add(&mut self, usage: TokenUsage) {
        self.prompt_eval_count = self.prompt_eval_count.saturating_add(usage.prompt_eval_count);
        self.eval_count = self.eval_count.saturating_add(usage.eval_count);
    }
}

/// Counter stored by another writer, possibly as a whole float (`10.0`)
fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    whole_count(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid usage counter: {}", value)))
}

/// Writes accumulated usage to the statistics file
#[derive(Debug, Clone)]
pub struct UsageRecorder {
    path: PathBuf,
}

impl UsageRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add the counters found in `body` to the persisted totals.
    ///
    /// Never fails: problems are logged at debug level and `None` is returned.
    pub async fn record(&self, body: &Value) -> Option<UsageTotals> {
        match self.try_record(TokenUsage::from_body(body)).await {
            Ok(totals) => Some(totals),
            Err(e) => {
                debug!("Failed to record token usage to {:?}: {:#}", self.path, e);
                None
            }
        }
    }

    /// Current persisted totals; zero when the file is missing or unreadable
    pub async fn totals(&self) -> UsageTotals {
        self.load().await.unwrap_or_default()
    }

    async fn try_record(&self, usage: TokenUsage) -> Result<UsageTotals> {
        let mut totals = match self.load().await {
            Ok(totals) => totals,
            Err(e) => {
                debug!("Starting usage totals from zero: {:#}", e);
                UsageTotals::default()
            }
        };
        totals.add(usage);

        let content = serde_json::to_string(&totals).context("Failed to serialize usage totals")?;
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write usage file: {:?}", self.path))?;

        debug!(
            "Recorded usage: prompt_eval_count={}, eval_count={}",
            totals.prompt_eval_count, totals.eval_count
        );
        Ok(totals)
    }

    async fn load(&self) -> Result<UsageTotals> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(UsageTotals::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read usage file: {:?}", self.path))
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse usage file: {:?}", self.path))
    }
}
