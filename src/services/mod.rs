//! Service layer module
//!
//! Contains the generation client, usage accounting, and the process-wide instance

pub mod client;
pub mod shared;
pub mod usage;

pub use client::*;
pub use usage::{UsageRecorder, UsageTotals};
