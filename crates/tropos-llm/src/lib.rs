//! Tropos Model Provider Layer
//!
//! Implementations of the `ModelProvider` trait from `tropos-domain`, plus
//! the [`ModelGateway`] that applies rate-limiter admission control to every
//! outbound call.
//!
//! # Providers
//!
//! - `MockProvider`: scripted responses for testing, no network
//! - `GeminiProvider`: Google Generative Language API over HTTP
//!
//! # Examples
//!
//! ```
//! use tropos_llm::MockProvider;
//! use tropos_domain::traits::ModelProvider;
//!
//! let provider = MockProvider::new(r#"{"candidates": []}"#);
//! let response = provider.generate("detect metaphors").unwrap();
//! assert!(response.contains("candidates"));
//! ```

#![warn(missing_docs)]

pub mod gateway;
pub mod gemini;

use std::sync::{Arc, Mutex};
use thiserror::Error;
use tropos_domain::traits::ModelProvider;

pub use gateway::{GatewayError, ModelGateway, Stage};
pub use gemini::GeminiProvider;

/// Errors that can occur during model operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("communication error: {0}")]
    Communication(String),

    /// The model returned something the provider could not decode
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available at the endpoint
    #[error("model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic provider error
    #[error("model error: {0}")]
    Other(String),
}

/// Scripted step for the mock provider
#[derive(Debug, Clone)]
enum MockStep {
    Respond(String),
    Fail(String),
}

/// Mock model provider for deterministic testing
///
/// Returns scripted responses in order, falling back to a fixed default
/// once the script is exhausted. Records every prompt it receives so tests
/// can assert on call counts and prompt contents. No network calls.
///
/// # Examples
///
/// ```
/// use tropos_llm::MockProvider;
/// use tropos_domain::traits::ModelProvider;
///
/// let provider = MockProvider::new("default");
/// provider.push_response("first");
/// assert_eq!(provider.generate("a").unwrap(), "first");
/// assert_eq!(provider.generate("b").unwrap(), "default");
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<Vec<MockStep>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a provider that returns `response` for every unscripted call
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a response for the next unscripted call
    pub fn push_response(&self, response: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push(MockStep::Respond(response.into()));
    }

    /// Queue a transport failure for the next unscripted call
    pub fn push_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push(MockStep::Fail(message.into()));
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl ModelProvider for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            return Ok(self.default_response.clone());
        }
        match script.remove(0) {
            MockStep::Respond(response) => Ok(response),
            MockStep::Fail(message) => Err(LlmError::Communication(message)),
        }
    }
}
