//! Per-model quotas and the combined ceilings derived from them

use serde::{Deserialize, Serialize};

/// Quota ceilings published for one model identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLimits {
    /// Requests per minute
    pub rpm: u32,

    /// Requests per day
    pub rpd: u32,
}

/// Shared ceilings enforced across both model identities as one pool.
///
/// Computed as the element-wise minimum of the per-model ceilings, so a
/// burst against either model can never exceed what the stricter of the two
/// quotas allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedLimits {
    /// Combined requests per minute
    pub rpm: u32,

    /// Combined requests per day
    pub rpd: u32,
}

/// Limiter configuration: the two model identities and their quotas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Stage-1 (detection) model identity
    pub stage1_model: String,

    /// Stage-1 model quotas
    pub stage1_limits: ModelLimits,

    /// Stage-2 (validation) model identity
    pub stage2_model: String,

    /// Stage-2 model quotas
    pub stage2_limits: ModelLimits,
}

impl LimiterConfig {
    /// Combined ceilings: the most restrictive of the two models
    pub fn combined(&self) -> CombinedLimits {
        CombinedLimits {
            rpm: self.stage1_limits.rpm.min(self.stage2_limits.rpm),
            rpd: self.stage1_limits.rpd.min(self.stage2_limits.rpd),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let combined = self.combined();
        if combined.rpm == 0 {
            return Err("combined rpm ceiling must be greater than 0".to_string());
        }
        if combined.rpd == 0 {
            return Err("combined rpd ceiling must be greater than 0".to_string());
        }
        if self.stage1_model.is_empty() || self.stage2_model.is_empty() {
            return Err("model identities must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for LimiterConfig {
    /// Free-tier quotas for the two Gemini models used by the pipeline
    fn default() -> Self {
        Self {
            stage1_model: "gemini-2.0-flash".to_string(),
            stage1_limits: ModelLimits { rpm: 15, rpd: 200 },
            stage2_model: "gemini-2.5-flash".to_string(),
            stage2_limits: ModelLimits { rpm: 10, rpd: 250 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_is_elementwise_minimum() {
        let config = LimiterConfig::default();
        let combined = config.combined();

        // rpm from stage 2, rpd from stage 1
        assert_eq!(combined.rpm, 10);
        assert_eq!(combined.rpd, 200);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(LimiterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let mut config = LimiterConfig::default();
        config.stage2_limits.rpm = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_model_identity_rejected() {
        let mut config = LimiterConfig::default();
        config.stage1_model.clear();
        assert!(config.validate().is_err());
    }
}
