//! Model request gateway
//!
//! Wraps every outbound model call with rate-limiter admission control.
//! The gateway owns one provider per pipeline stage plus a shared limiter
//! handle; callers name the stage, the gateway resolves the model identity
//! and surfaces limiter denials and transport errors as distinct variants.

use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};
use tropos_domain::traits::ModelProvider;
use tropos_limiter::{LimiterError, RateLimiter, UsageSummary};

/// Which pipeline stage a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Stage 1: broad metaphor detection
    Detection,
    /// Stage 2: strict validation of stage-1 candidates
    Validation,
}

/// Errors surfaced by the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Admission denied: the daily combined quota is exhausted
    #[error(transparent)]
    Quota(#[from] LimiterError),

    /// The model invocation collaborator failed
    #[error("transport error from {model}: {message}")]
    Transport {
        /// Model identity the request was bound for
        model: String,
        /// Provider error rendered as text
        message: String,
    },
}

/// One provider bound to its model identity
struct StageSlot<P> {
    model_id: String,
    provider: P,
}

/// Gateway applying admission control to both pipeline stages
pub struct ModelGateway<P> {
    stage1: StageSlot<P>,
    stage2: StageSlot<P>,
    limiter: Arc<RateLimiter>,
}

impl<P> ModelGateway<P>
where
    P: ModelProvider,
    P::Error: Display,
{
    /// Create a gateway from the two stage providers and a shared limiter
    pub fn new(
        stage1_model: impl Into<String>,
        stage1_provider: P,
        stage2_model: impl Into<String>,
        stage2_provider: P,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            stage1: StageSlot {
                model_id: stage1_model.into(),
                provider: stage1_provider,
            },
            stage2: StageSlot {
                model_id: stage2_model.into(),
                provider: stage2_provider,
            },
            limiter,
        }
    }

    /// Model identity used for the given stage
    pub fn model_id(&self, stage: Stage) -> &str {
        match stage {
            Stage::Detection => &self.stage1.model_id,
            Stage::Validation => &self.stage2.model_id,
        }
    }

    /// Issue one budget-checked request for the given stage.
    ///
    /// Blocks while the limiter waits out the rolling window; fails fast
    /// when the daily quota is exhausted or the transport errors.
    pub fn request(&self, stage: Stage, prompt: &str) -> Result<String, GatewayError> {
        let slot = match stage {
            Stage::Detection => &self.stage1,
            Stage::Validation => &self.stage2,
        };

        self.limiter.admit(&slot.model_id)?;

        debug!(
            model = %slot.model_id,
            prompt_chars = prompt.len(),
            "sending model request"
        );

        match slot.provider.generate(prompt) {
            Ok(response) => {
                debug!(
                    model = %slot.model_id,
                    response_chars = response.len(),
                    "model response received"
                );
                Ok(response)
            }
            Err(e) => {
                error!(model = %slot.model_id, error = %e, "model request failed");
                Err(GatewayError::Transport {
                    model: slot.model_id.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Proxy the limiter's usage summary
    pub fn usage_summary(&self) -> UsageSummary {
        self.limiter.get_usage_summary()
    }

    /// Shared limiter handle
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;
    use tropos_limiter::{LimiterConfig, ModelLimits};

    fn test_limiter(rpm: u32, rpd: u32) -> Arc<RateLimiter> {
        Arc::new(RateLimiter::new(LimiterConfig {
            stage1_model: "model-a".to_string(),
            stage1_limits: ModelLimits { rpm, rpd },
            stage2_model: "model-b".to_string(),
            stage2_limits: ModelLimits { rpm, rpd },
        }))
    }

    fn test_gateway(limiter: Arc<RateLimiter>) -> (ModelGateway<MockProvider>, MockProvider, MockProvider) {
        let p1 = MockProvider::new("stage1 response");
        let p2 = MockProvider::new("stage2 response");
        let gateway = ModelGateway::new("model-a", p1.clone(), "model-b", p2.clone(), limiter);
        (gateway, p1, p2)
    }

    #[test]
    fn test_request_routes_to_stage_provider() {
        let (gateway, p1, p2) = test_gateway(test_limiter(10, 100));

        let r1 = gateway.request(Stage::Detection, "detect").unwrap();
        let r2 = gateway.request(Stage::Validation, "validate").unwrap();

        assert_eq!(r1, "stage1 response");
        assert_eq!(r2, "stage2 response");
        assert_eq!(p1.call_count(), 1);
        assert_eq!(p2.call_count(), 1);
    }

    #[test]
    fn test_request_consumes_combined_budget() {
        let (gateway, _, _) = test_gateway(test_limiter(10, 100));

        gateway.request(Stage::Detection, "a").unwrap();
        gateway.request(Stage::Validation, "b").unwrap();

        let usage = gateway.usage_summary();
        assert_eq!(usage.rpd_used, 2);
        assert_eq!(usage.by_model["model-a"], 1);
        assert_eq!(usage.by_model["model-b"], 1);
    }

    #[test]
    fn test_daily_exhaustion_is_quota_error() {
        let (gateway, p1, _) = test_gateway(test_limiter(10, 1));

        gateway.request(Stage::Detection, "a").unwrap();
        let err = gateway.request(Stage::Validation, "b").unwrap_err();

        assert!(matches!(err, GatewayError::Quota(_)));
        // The provider is never reached when admission is denied
        assert_eq!(p1.call_count(), 1);
    }

    #[test]
    fn test_transport_failure_names_the_model() {
        let (gateway, p1, _) = test_gateway(test_limiter(10, 100));
        p1.push_error("boom");

        let err = gateway.request(Stage::Detection, "a").unwrap_err();
        match err {
            GatewayError::Transport { model, message } => {
                assert_eq!(model, "model-a");
                assert!(message.contains("boom"));
            }
            other => panic!("expected Transport, got {:?}", other),
        }

        // The failed request still consumed budget: admission precedes the call
        assert_eq!(gateway.usage_summary().rpd_used, 1);
    }

    #[test]
    fn test_model_id_lookup() {
        let (gateway, _, _) = test_gateway(test_limiter(10, 100));
        assert_eq!(gateway.model_id(Stage::Detection), "model-a");
        assert_eq!(gateway.model_id(Stage::Validation), "model-b");
    }
}
