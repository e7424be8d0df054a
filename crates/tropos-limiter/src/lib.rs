//! Tropos Rate Limiter
//!
//! Combined admission control for the two model identities used by the
//! pipeline. Both models draw from one shared budget: no more than the
//! combined per-minute ceiling in any trailing 60-second window, and no more
//! than the combined per-day ceiling within the current day. The combined
//! ceilings are the minimum of the per-model ceilings, so the shared pool is
//! never more permissive than either model's own quota.
//!
//! # Example
//!
//! ```
//! use tropos_limiter::{LimiterConfig, RateLimiter};
//!
//! let limiter = RateLimiter::new(LimiterConfig::default());
//! limiter.admit("gemini-2.0-flash").unwrap();
//!
//! let usage = limiter.get_usage_summary();
//! assert_eq!(usage.rpd_used, 1);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod limiter;

pub use config::{CombinedLimits, LimiterConfig, ModelLimits};
pub use error::LimiterError;
pub use limiter::{RateLimiter, UsageSummary};
