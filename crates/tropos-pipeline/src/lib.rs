//! Tropos Analysis Pipeline
//!
//! The two-stage metaphor detection pipeline: a broad detection call, an
//! inter-stage cooldown tuned to live rate-limit usage, then a strict
//! validation call, assembled into one immutable [`AnalysisResult`].
//!
//! # Architecture
//!
//! ```text
//! Text → detection prompt → Gateway (stage 1) → extractor → candidates
//!      → cooldown → validation prompt → Gateway (stage 2) → extractor
//!      → approved → AnalysisResult
//! ```
//!
//! Stage failures never raise out of the pipeline; they are captured into
//! the result's `success`/`error` fields so the caller decides whether to
//! skip, log, or retry the unit of work.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tropos_limiter::{LimiterConfig, RateLimiter};
//! use tropos_llm::{MockProvider, ModelGateway};
//! use tropos_pipeline::{Analyzer, PipelineConfig};
//!
//! let limiter = Arc::new(RateLimiter::new(LimiterConfig::default()));
//! let gateway = ModelGateway::new(
//!     "gemini-2.0-flash",
//!     MockProvider::new(r#"{"candidates": []}"#),
//!     "gemini-2.5-flash",
//!     MockProvider::new(r#"{"metaphors": []}"#),
//!     limiter,
//! );
//!
//! let analyzer = Analyzer::new(gateway, PipelineConfig::default());
//! let result = analyzer.run_pipeline("The markets weathered the storm.");
//! assert!(result.success);
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
pub mod parser;
pub mod prompt;


pub use analyzer::Analyzer;
pub use config::PipelineConfig;
