//! Error types for the rate limiter

use chrono::{DateTime, Local};
use thiserror::Error;

/// Errors that can occur during admission
#[derive(Error, Debug, Clone)]
pub enum LimiterError {
    /// The combined daily ceiling has been reached. Fatal for the current
    /// run; the caller must stop issuing requests until the reset instant.
    #[error("daily combined quota exhausted ({used}/{limit} requests); resets at {resets_at}")]
    DailyQuotaExhausted {
        /// Requests consumed today
        used: u32,
        /// Combined daily ceiling
        limit: u32,
        /// When the daily counter resets
        resets_at: DateTime<Local>,
    },
}
