//! Combined rate limit control for the two-stage pipeline

use crate::config::{CombinedLimits, LimiterConfig};
use crate::error::LimiterError;
use chrono::{DateTime, Days, Local};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Length of the rolling admission window
const WINDOW: Duration = Duration::from_secs(60);

/// Safety margin added to computed waits to avoid boundary races
const WAIT_MARGIN: Duration = Duration::from_secs(1);

/// Point-in-time usage against both ceilings, plus the per-model breakdown
#[derive(Debug, Clone, Serialize)]
pub struct UsageSummary {
    /// Requests within the trailing 60-second window
    pub rpm_used: u32,

    /// Combined per-minute ceiling
    pub rpm_limit: u32,

    /// Requests consumed today
    pub rpd_used: u32,

    /// Combined per-day ceiling
    pub rpd_limit: u32,

    /// Per-model request counts (statistics only, not enforcement)
    pub by_model: BTreeMap<String, u64>,
}

/// Outcome of one admission attempt at a given instant
#[derive(Debug, Clone, PartialEq, Eq)]
enum Admission {
    /// Admitted; carries the usage recorded for this request
    Granted { rpm_used: u32, rpd_used: u32 },

    /// Per-minute ceiling reached; retry after this duration
    RetryAfter(Duration),

    /// Daily ceiling reached until the given instant
    Exhausted {
        used: u32,
        resets_at: DateTime<Local>,
    },
}

/// Shared admission state. All mutation happens under the limiter's lock.
#[derive(Debug)]
struct LimiterState {
    /// Time-ordered instants of recent admissions
    window: VecDeque<Instant>,

    /// Requests admitted since the last daily reset
    daily_count: u32,

    /// When the daily counter next resets
    daily_reset: DateTime<Local>,

    /// Per-model admission counts (statistics only)
    by_model: BTreeMap<String, u64>,
}

impl LimiterState {
    fn new(config: &LimiterConfig, now: DateTime<Local>) -> Self {
        let mut by_model = BTreeMap::new();
        by_model.insert(config.stage1_model.clone(), 0);
        by_model.insert(config.stage2_model.clone(), 0);
        Self {
            window: VecDeque::new(),
            daily_count: 0,
            daily_reset: next_midnight(now),
            by_model,
        }
    }

    /// Drop window entries older than 60 seconds
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.window.front() {
            if now.duration_since(oldest) >= WINDOW {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }

    /// One admission step at an explicit instant.
    ///
    /// Pure with respect to the clock: both `admit`'s blocking loop and the
    /// tests drive this same code path with their own notion of now.
    fn step(
        &mut self,
        limits: CombinedLimits,
        model_id: &str,
        now: Instant,
        today: DateTime<Local>,
    ) -> Admission {
        // Daily reset: first observation at or past the stored instant
        if today >= self.daily_reset {
            self.daily_count = 0;
            for count in self.by_model.values_mut() {
                *count = 0;
            }
            self.daily_reset = next_midnight(today);
            info!(resets_at = %self.daily_reset, "combined rate limits reset for new day");
        }

        if self.daily_count >= limits.rpd {
            return Admission::Exhausted {
                used: self.daily_count,
                resets_at: self.daily_reset,
            };
        }

        self.prune(now);

        if self.window.len() as u32 >= limits.rpm {
            // Wait for the oldest entry to age out of the window
            let oldest = self.window[0];
            let elapsed = now.duration_since(oldest);
            let wait = WINDOW.saturating_sub(elapsed) + WAIT_MARGIN;
            return Admission::RetryAfter(wait);
        }

        self.window.push_back(now);
        self.daily_count += 1;
        // Unrecognized identities are tracked separately but still count
        // toward the combined totals above
        *self.by_model.entry(model_id.to_string()).or_insert(0) += 1;

        Admission::Granted {
            rpm_used: self.window.len() as u32,
            rpd_used: self.daily_count,
        }
    }
}

/// Combined rate limit control across both model identities.
///
/// One limiter is constructed per process and shared (by reference or via
/// `Arc`) with every call site. `admit` blocks the calling thread when the
/// per-minute ceiling is reached and fails when the daily ceiling is
/// exhausted; both ceilings span the two models as one pool.
#[derive(Debug)]
pub struct RateLimiter {
    limits: CombinedLimits,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    /// Create a limiter from per-model quotas
    pub fn new(config: LimiterConfig) -> Self {
        let limits = config.combined();
        let state = LimiterState::new(&config, Local::now());
        Self {
            limits,
            state: Mutex::new(state),
        }
    }

    /// Combined ceilings this limiter enforces
    pub fn limits(&self) -> CombinedLimits {
        self.limits
    }

    /// Request admission for one outbound call to `model_id`.
    ///
    /// Blocks until the rolling window has room, recording the request on
    /// admission. Fails with [`LimiterError::DailyQuotaExhausted`] when the
    /// combined daily ceiling has been reached; that condition is fatal to
    /// the current run and is not retried here.
    pub fn admit(&self, model_id: &str) -> Result<(), LimiterError> {
        loop {
            let admission = {
                let mut state = self.state.lock().expect("limiter lock poisoned");
                state.step(self.limits, model_id, Instant::now(), Local::now())
            };

            match admission {
                Admission::Granted { rpm_used, rpd_used } => {
                    info!(
                        model = model_id,
                        rpm = format_args!("{}/{}", rpm_used, self.limits.rpm),
                        rpd = format_args!("{}/{}", rpd_used, self.limits.rpd),
                        "request admitted"
                    );
                    return Ok(());
                }
                Admission::RetryAfter(wait) => {
                    debug!(
                        model = model_id,
                        wait_secs = wait.as_secs_f64(),
                        "combined per-minute ceiling reached, waiting"
                    );
                    std::thread::sleep(wait);
                }
                Admission::Exhausted { used, resets_at } => {
                    warn!(
                        model = model_id,
                        rpd = format_args!("{}/{}", used, self.limits.rpd),
                        resets_at = %resets_at,
                        "daily combined quota exhausted"
                    );
                    return Err(LimiterError::DailyQuotaExhausted {
                        used,
                        limit: self.limits.rpd,
                        resets_at,
                    });
                }
            }
        }
    }

    /// Current usage against both ceilings.
    ///
    /// Prunes window entries older than 60 seconds but does not otherwise
    /// mutate admission state; safe to call at any time.
    pub fn get_usage_summary(&self) -> UsageSummary {
        let mut state = self.state.lock().expect("limiter lock poisoned");
        state.prune(Instant::now());
        UsageSummary {
            rpm_used: state.window.len() as u32,
            rpm_limit: self.limits.rpm,
            rpd_used: state.daily_count,
            rpd_limit: self.limits.rpd,
            by_model: state.by_model.clone(),
        }
    }
}

/// Midnight local time on the day after `after`.
///
/// Falls back to a flat 24-hour offset if midnight does not exist in the
/// local timezone (DST gap).
fn next_midnight(after: DateTime<Local>) -> DateTime<Local> {
    (after.date_naive() + Days::new(1))
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .unwrap_or_else(|| after + chrono::Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelLimits;

    fn test_config(rpm: u32, rpd: u32) -> LimiterConfig {
        LimiterConfig {
            stage1_model: "model-a".to_string(),
            stage1_limits: ModelLimits { rpm, rpd },
            stage2_model: "model-b".to_string(),
            stage2_limits: ModelLimits { rpm, rpd },
        }
    }

    fn test_state(config: &LimiterConfig) -> LimiterState {
        LimiterState::new(config, Local::now())
    }

    #[test]
    fn test_admissions_granted_under_ceiling() {
        let config = test_config(5, 100);
        let limits = config.combined();
        let mut state = test_state(&config);
        let base = Instant::now();

        for i in 0..5 {
            let admission = state.step(limits, "model-a", base + Duration::from_secs(i), Local::now());
            assert!(matches!(admission, Admission::Granted { .. }));
        }
        assert_eq!(state.window.len(), 5);
        assert_eq!(state.daily_count, 5);
    }

    #[test]
    fn test_window_never_exceeds_ceiling() {
        let config = test_config(3, 100);
        let limits = config.combined();
        let mut state = test_state(&config);
        let base = Instant::now();

        for _ in 0..3 {
            let admission = state.step(limits, "model-a", base, Local::now());
            assert!(matches!(admission, Admission::Granted { .. }));
        }

        // Fourth within the same window must not be admitted
        let admission = state.step(limits, "model-a", base + Duration::from_secs(30), Local::now());
        assert!(matches!(admission, Admission::RetryAfter(_)));
        assert_eq!(state.window.len(), 3);

        // After the oldest entries age out, admission resumes
        let admission = state.step(limits, "model-a", base + Duration::from_secs(61), Local::now());
        assert!(matches!(admission, Admission::Granted { .. }));
        assert!(state.window.len() as u32 <= limits.rpm);
    }

    #[test]
    fn test_third_admission_waits_out_the_window() {
        // Ceiling of 2; three admissions within one second. The third must
        // wait until at least 59 seconds have elapsed since the first.
        let config = test_config(2, 100);
        let limits = config.combined();
        let mut state = test_state(&config);
        let base = Instant::now();

        assert!(matches!(
            state.step(limits, "model-a", base, Local::now()),
            Admission::Granted { .. }
        ));
        assert!(matches!(
            state.step(limits, "model-b", base + Duration::from_millis(500), Local::now()),
            Admission::Granted { .. }
        ));

        let third = base + Duration::from_secs(1);
        match state.step(limits, "model-a", third, Local::now()) {
            Admission::RetryAfter(wait) => {
                // 1s has elapsed since the first admission; the admission
                // instant after waiting is >= 60s past it (59s remaining
                // plus the 1s safety margin)
                assert!(wait >= Duration::from_secs(59));
                assert!(wait <= Duration::from_secs(61));
            }
            other => panic!("expected RetryAfter, got {:?}", other),
        }
    }

    #[test]
    fn test_retry_after_reflects_live_window() {
        let config = test_config(2, 100);
        let limits = config.combined();
        let mut state = test_state(&config);
        let base = Instant::now();

        state.step(limits, "model-a", base, Local::now());
        state.step(limits, "model-a", base + Duration::from_secs(10), Local::now());

        // 40s into the window: the oldest entry has 20s left plus margin
        match state.step(limits, "model-a", base + Duration::from_secs(40), Local::now()) {
            Admission::RetryAfter(wait) => {
                assert_eq!(wait, Duration::from_secs(21));
            }
            other => panic!("expected RetryAfter, got {:?}", other),
        }
    }

    #[test]
    fn test_daily_quota_exhaustion() {
        let config = test_config(10, 2);
        let limits = config.combined();
        let mut state = test_state(&config);
        let base = Instant::now();

        state.step(limits, "model-a", base, Local::now());
        state.step(limits, "model-b", base + Duration::from_secs(1), Local::now());

        let admission = state.step(limits, "model-a", base + Duration::from_secs(2), Local::now());
        match admission {
            Admission::Exhausted { resets_at, .. } => {
                assert!(resets_at > Local::now());
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
        assert_eq!(state.daily_count, 2);
    }

    #[test]
    fn test_daily_reset_zeroes_counters() {
        let config = test_config(10, 2);
        let limits = config.combined();
        let mut state = test_state(&config);
        let base = Instant::now();

        state.step(limits, "model-a", base, Local::now());
        state.step(limits, "model-a", base + Duration::from_secs(1), Local::now());
        assert!(matches!(
            state.step(limits, "model-a", base + Duration::from_secs(2), Local::now()),
            Admission::Exhausted { .. }
        ));

        // Simulate the clock reaching the stored reset instant
        let reset = state.daily_reset;
        let admission = state.step(limits, "model-a", base + Duration::from_secs(3), reset);
        assert!(matches!(admission, Admission::Granted { .. }));
        assert_eq!(state.daily_count, 1);
        assert_eq!(state.by_model["model-a"], 1);
        // Reset instant advanced past the old one
        assert!(state.daily_reset > reset);
    }

    #[test]
    fn test_per_model_counters_track_statistics_only() {
        let config = test_config(10, 100);
        let limits = config.combined();
        let mut state = test_state(&config);
        let base = Instant::now();

        state.step(limits, "model-a", base, Local::now());
        state.step(limits, "model-a", base + Duration::from_secs(1), Local::now());
        state.step(limits, "model-b", base + Duration::from_secs(2), Local::now());
        // Unrecognized identity still counts toward combined totals
        state.step(limits, "model-x", base + Duration::from_secs(3), Local::now());

        assert_eq!(state.by_model["model-a"], 2);
        assert_eq!(state.by_model["model-b"], 1);
        assert_eq!(state.by_model["model-x"], 1);
        assert_eq!(state.daily_count, 4);
        assert_eq!(state.window.len(), 4);
    }

    #[test]
    fn test_admit_records_through_public_api() {
        let limiter = RateLimiter::new(test_config(10, 100));
        limiter.admit("model-a").unwrap();
        limiter.admit("model-b").unwrap();

        let usage = limiter.get_usage_summary();
        assert_eq!(usage.rpm_used, 2);
        assert_eq!(usage.rpd_used, 2);
        assert_eq!(usage.rpm_limit, 10);
        assert_eq!(usage.rpd_limit, 100);
        assert_eq!(usage.by_model["model-a"], 1);
        assert_eq!(usage.by_model["model-b"], 1);
    }

    #[test]
    fn test_admit_fails_when_daily_exhausted() {
        let limiter = RateLimiter::new(test_config(10, 1));
        limiter.admit("model-a").unwrap();

        let err = limiter.admit("model-b").unwrap_err();
        let LimiterError::DailyQuotaExhausted { used, limit, .. } = err;
        assert_eq!(used, 1);
        assert_eq!(limit, 1);
    }

    #[test]
    fn test_usage_summary_is_serializable() {
        let limiter = RateLimiter::new(test_config(10, 100));
        limiter.admit("model-a").unwrap();

        let json = serde_json::to_value(limiter.get_usage_summary()).unwrap();
        assert_eq!(json["rpm_used"], 1);
        assert_eq!(json["by_model"]["model-a"], 1);
    }

    #[test]
    fn test_concurrent_admissions_stay_consistent() {
        use std::sync::Arc;

        let limiter = Arc::new(RateLimiter::new(test_config(50, 1000)));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    let model = if i % 2 == 0 { "model-a" } else { "model-b" };
                    for _ in 0..5 {
                        limiter.admit(model).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let usage = limiter.get_usage_summary();
        assert_eq!(usage.rpd_used, 40);
        assert_eq!(usage.by_model["model-a"] + usage.by_model["model-b"], 40);
    }

    #[test]
    fn test_next_midnight_is_start_of_next_day() {
        let now = Local::now();
        let midnight = next_midnight(now);
        assert!(midnight > now);
        assert_eq!(midnight.date_naive(), now.date_naive() + Days::new(1));
    }
}
