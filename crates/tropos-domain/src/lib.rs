//! Tropos Domain Layer
//!
//! Core value types and trait seams for the two-stage metaphor analysis
//! pipeline. This crate holds the shapes that cross into the model and
//! persistence collaborators; infrastructure implementations live in the
//! other crates.
//!
//! ## Key Concepts
//!
//! - **MetaphorCandidate**: a span of source text plus its surrounding
//!   context, proposed by the detection stage
//! - **AnalysisResult**: the immutable outcome of one pipeline run over one
//!   input text (candidates, approved subset, counts, success/error)
//! - **Speech**: one stored document awaiting or carrying an analysis
//! - **Traits**: `ModelProvider` (model invocation) and `SpeechStore`
//!   (persistence), the two external collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod metaphor;
pub mod speech;
pub mod traits;

// Re-exports for convenience
pub use metaphor::{AnalysisResult, MetaphorCandidate};
pub use speech::{ProcessingStats, Speech};
