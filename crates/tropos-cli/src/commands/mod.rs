//! Command implementations.

pub mod analyze;
pub mod batch;
pub mod import;
pub mod stats;

pub use self::analyze::execute_analyze;
pub use self::batch::execute_batch;
pub use self::import::execute_import;
pub use self::stats::execute_stats;

use crate::config::Config;
use crate::error::{CliError, Result};
use std::sync::Arc;
use tropos_limiter::RateLimiter;
use tropos_llm::{GeminiProvider, ModelGateway};
use tropos_pipeline::Analyzer;

/// Build the full analysis stack from configuration: two providers bound to
/// the configured model identities, one shared limiter, one analyzer.
pub(crate) fn build_analyzer(config: &Config) -> Result<Analyzer<GeminiProvider>> {
    config.limits.validate().map_err(CliError::Config)?;
    let api_key = config.resolve_api_key()?;

    let stage1 = GeminiProvider::new(api_key.as_str(), config.limits.stage1_model.as_str())?;
    let stage2 = GeminiProvider::new(api_key.as_str(), config.limits.stage2_model.as_str())?;
    let limiter = Arc::new(RateLimiter::new(config.limits.clone()));

    let gateway = ModelGateway::new(
        config.limits.stage1_model.clone(),
        stage1,
        config.limits.stage2_model.clone(),
        stage2,
        limiter,
    );

    Ok(Analyzer::new(gateway, config.pipeline.clone()))
}
