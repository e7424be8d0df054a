//! Two-stage analyzer state machine

use crate::config::PipelineConfig;
use crate::parser::{extract_json, parse_candidate_array, preview};
use crate::prompt::{detection_prompt, validation_prompt};
use std::fmt::Display;
use std::time::Duration;
use tracing::{info, warn};
use tropos_domain::traits::ModelProvider;
use tropos_domain::{AnalysisResult, MetaphorCandidate};
use tropos_limiter::UsageSummary;
use tropos_llm::{ModelGateway, Stage};

type SleepFn = Box<dyn Fn(Duration) + Send + Sync>;

/// Pipeline progression for one unit of work. `Failed` absorbs from any
/// point; both terminal states carry the assembled result.
enum State {
    Idle,
    Stage1Requested { raw: String },
    Stage1Parsed { candidates: Vec<MetaphorCandidate> },
    Cooldown { candidates: Vec<MetaphorCandidate> },
    Stage2Requested { candidates: Vec<MetaphorCandidate>, raw: String },
    Stage2Parsed { candidates: Vec<MetaphorCandidate>, approved: Vec<MetaphorCandidate> },
    Done(AnalysisResult),
    Failed(AnalysisResult),
}

/// The two-stage metaphor analyzer.
///
/// Runs one text fully to completion: detection call, inter-stage cooldown
/// tuned to live combined usage, validation call, result assembly. All
/// blocking (admission waits, cooldown, transport) happens inline; one unit
/// of work finishes before the next begins.
pub struct Analyzer<P: ModelProvider> {
    gateway: ModelGateway<P>,
    config: PipelineConfig,
    sleeper: SleepFn,
}

impl<P> Analyzer<P>
where
    P: ModelProvider,
    P::Error: Display,
{
    /// Create an analyzer over a gateway
    pub fn new(gateway: ModelGateway<P>, config: PipelineConfig) -> Self {
        Self {
            gateway,
            config,
            sleeper: Box::new(|d| std::thread::sleep(d)),
        }
    }

    /// Replace the cooldown sleep, so tests can drive the machine without
    /// wall-clock delays
    #[cfg(test)]
    pub(crate) fn with_sleeper(mut self, sleeper: SleepFn) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Run the full two-stage analysis over one text.
    ///
    /// Never panics and never returns an error: stage failures are captured
    /// into the result's `success`/`error` fields. When the failure was the
    /// daily quota, the caller should stop submitting work until the reset
    /// instant; `usage_summary` exposes the remaining budget.
    pub fn run_pipeline(&self, text: &str) -> AnalysisResult {
        let mut state = State::Idle;
        loop {
            state = match state {
                State::Idle => self.request_stage1(text),
                State::Stage1Requested { raw } => self.parse_stage1(&raw),
                State::Stage1Parsed { candidates } => {
                    if candidates.is_empty() {
                        // Nothing to validate: skip the cooldown and the
                        // second budgeted call entirely
                        info!("no candidates detected, ending analysis");
                        State::Done(AnalysisResult::empty(
                            self.stage1_model(),
                            self.stage2_model(),
                        ))
                    } else {
                        State::Cooldown { candidates }
                    }
                }
                State::Cooldown { candidates } => {
                    let pause = self.cooldown_duration();
                    info!(
                        pause_secs = pause.as_secs(),
                        candidates = candidates.len(),
                        "cooling down between stages"
                    );
                    (self.sleeper)(pause);
                    self.request_stage2(candidates)
                }
                State::Stage2Requested { candidates, raw } => self.parse_stage2(candidates, &raw),
                State::Stage2Parsed { candidates, approved } => {
                    info!(
                        detected = candidates.len(),
                        approved = approved.len(),
                        rejected = candidates.len().saturating_sub(approved.len()),
                        "analysis complete"
                    );
                    State::Done(AnalysisResult::completed(
                        self.stage1_model(),
                        self.stage2_model(),
                        candidates,
                        approved,
                    ))
                }
                State::Done(result) | State::Failed(result) => return result,
            };
        }
    }

    /// Proxy the limiter's usage summary for the caller's budgeting
    pub fn usage_summary(&self) -> UsageSummary {
        self.gateway.usage_summary()
    }

    fn stage1_model(&self) -> &str {
        self.gateway.model_id(Stage::Detection)
    }

    fn stage2_model(&self) -> &str {
        self.gateway.model_id(Stage::Validation)
    }

    fn request_stage1(&self, text: &str) -> State {
        info!(model = self.stage1_model(), "stage 1: detecting candidates");
        match self.gateway.request(Stage::Detection, &detection_prompt(text)) {
            Ok(raw) => State::Stage1Requested { raw },
            Err(e) => State::Failed(AnalysisResult::failed(
                self.stage1_model(),
                self.stage2_model(),
                format!("stage 1 error: {}", e),
            )),
        }
    }

    fn parse_stage1(&self, raw: &str) -> State {
        match extract_json(raw) {
            Some(value) => {
                let candidates = parse_candidate_array(&value, "candidates");
                info!(count = candidates.len(), "stage 1: candidates detected");
                State::Stage1Parsed { candidates }
            }
            None => {
                warn!(raw = %preview(raw), "stage 1: no structured result found");
                State::Failed(AnalysisResult::failed(
                    self.stage1_model(),
                    self.stage2_model(),
                    "stage 1 JSON parsing failed",
                ))
            }
        }
    }

    fn request_stage2(&self, candidates: Vec<MetaphorCandidate>) -> State {
        info!(model = self.stage2_model(), "stage 2: validating candidates");
        match self
            .gateway
            .request(Stage::Validation, &validation_prompt(&candidates))
        {
            Ok(raw) => State::Stage2Requested { candidates, raw },
            Err(e) => State::Failed(AnalysisResult::partial(
                self.stage1_model(),
                self.stage2_model(),
                candidates,
                format!("stage 2 error: {}", e),
            )),
        }
    }

    fn parse_stage2(&self, candidates: Vec<MetaphorCandidate>, raw: &str) -> State {
        match extract_json(raw) {
            Some(value) => {
                let approved = parse_candidate_array(&value, "metaphors");
                State::Stage2Parsed { candidates, approved }
            }
            None => {
                warn!(raw = %preview(raw), "stage 2: no structured result found");
                State::Failed(AnalysisResult::partial(
                    self.stage1_model(),
                    self.stage2_model(),
                    candidates,
                    "stage 2 JSON parsing failed",
                ))
            }
        }
    }

    /// Inter-stage cooldown: `max(minimum_pause, rpm_ceiling - window_usage)`
    /// seconds. Reacts to live combined usage so a nearly idle budget yields
    /// a short pause and a nearly saturated one close to a full window.
    fn cooldown_duration(&self) -> Duration {
        let usage = self.gateway.usage_summary();
        let headroom = usage.rpm_limit.saturating_sub(usage.rpm_used) as u64;
        Duration::from_secs(headroom).max(self.config.minimum_pause())
    }
}
