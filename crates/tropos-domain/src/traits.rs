//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline core and its two
//! collaborators: model invocation and persistence. Infrastructure
//! implementations live in other crates.

use crate::{AnalysisResult, ProcessingStats, Speech};
use std::time::Duration;

/// Trait for invoking a model with a plain-text prompt
///
/// Implemented by the infrastructure layer (tropos-llm). The core does not
/// specify wire protocol, authentication, or transport retries; those belong
/// to the implementation.
pub trait ModelProvider {
    /// Error type for model operations
    type Error;

    /// Send a prompt and return the raw response text
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Trait for storing and retrieving speeches and their analyses
///
/// Implemented by the infrastructure layer (tropos-store)
pub trait SpeechStore {
    /// Error type for store operations
    type Error;

    /// Fetch speeches that have not been analyzed yet
    fn unprocessed_speeches(&self, limit: Option<usize>) -> Result<Vec<Speech>, Self::Error>;

    /// Persist an analysis result against a speech, with the wall-clock
    /// duration the pipeline took to produce it
    fn save_analysis(
        &mut self,
        speech_id: i64,
        result: &AnalysisResult,
        processing_time: Duration,
    ) -> Result<(), Self::Error>;

    /// Aggregate processed/unprocessed counts
    fn statistics(&self) -> Result<ProcessingStats, Self::Error>;

    /// Sample of already-processed speeches, for reporting
    fn processed_sample(&self, limit: usize) -> Result<Vec<(Speech, usize)>, Self::Error>;
}
