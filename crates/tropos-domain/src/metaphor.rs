//! Metaphor candidates and the per-text analysis result

use serde::{Deserialize, Serialize};

/// A span of source text proposed as a conceptual metaphor, together with
/// the surrounding context it appeared in.
///
/// Stage 1 proposes candidates; stage 2 confirms a subset of them. Approved
/// metaphors share this shape. Candidates are ephemeral within one pipeline
/// run and are only persisted as an audit trail alongside the final result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaphorCandidate {
    /// Exact metaphor text as it appears in the source
    pub text: String,

    /// Complete context in which the span appears
    pub context: String,
}

impl MetaphorCandidate {
    /// Create a candidate from a span and its context
    pub fn new(text: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: context.into(),
        }
    }
}

/// Outcome of one two-stage analysis over one input text.
///
/// Produced exactly once per input; immutable after creation. The caller
/// owns the result and decides whether and how to persist it. Stage errors
/// never raise out of the pipeline; they land in `success`/`error` so the
/// caller can skip, log, or retry the unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Candidates proposed by stage 1
    pub candidates: Vec<MetaphorCandidate>,

    /// Subset of candidates confirmed by stage 2
    pub approved: Vec<MetaphorCandidate>,

    /// Model identity used for detection
    pub stage1_model: String,

    /// Model identity used for validation
    pub stage2_model: String,

    /// Number of stage-1 candidates
    pub stage1_count: usize,

    /// Number of stage-2 approvals
    pub stage2_count: usize,

    /// Candidates rejected by stage 2
    pub rejected_count: usize,

    /// Whether the run completed without a stage failure
    pub success: bool,

    /// Failure reason for the stage that failed, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Result for a run where stage 1 found nothing to validate.
    ///
    /// This is the short-circuit case: zero candidates, zero approved,
    /// success, and no stage-2 call was made.
    pub fn empty(stage1_model: impl Into<String>, stage2_model: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            approved: Vec::new(),
            stage1_model: stage1_model.into(),
            stage2_model: stage2_model.into(),
            stage1_count: 0,
            stage2_count: 0,
            rejected_count: 0,
            success: true,
            error: None,
        }
    }

    /// Result for a run that failed before producing any candidates
    pub fn failed(
        stage1_model: impl Into<String>,
        stage2_model: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: Some(error.into()),
            success: false,
            ..Self::empty(stage1_model, stage2_model)
        }
    }

    /// Result for a run that failed after stage 1, preserving the
    /// candidates collected so far
    pub fn partial(
        stage1_model: impl Into<String>,
        stage2_model: impl Into<String>,
        candidates: Vec<MetaphorCandidate>,
        error: impl Into<String>,
    ) -> Self {
        let stage1_count = candidates.len();
        Self {
            candidates,
            stage1_count,
            error: Some(error.into()),
            success: false,
            ..Self::empty(stage1_model, stage2_model)
        }
    }

    /// Result for a fully completed run
    pub fn completed(
        stage1_model: impl Into<String>,
        stage2_model: impl Into<String>,
        candidates: Vec<MetaphorCandidate>,
        approved: Vec<MetaphorCandidate>,
    ) -> Self {
        let stage1_count = candidates.len();
        let stage2_count = approved.len();
        Self {
            rejected_count: stage1_count.saturating_sub(stage2_count),
            candidates,
            approved,
            stage1_count,
            stage2_count,
            success: true,
            error: None,
            ..Self::empty(stage1_model, stage2_model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(n: usize) -> MetaphorCandidate {
        MetaphorCandidate::new(format!("metaphor {}", n), format!("context {}", n))
    }

    #[test]
    fn test_empty_result() {
        let result = AnalysisResult::empty("model-a", "model-b");
        assert!(result.success);
        assert_eq!(result.stage1_count, 0);
        assert_eq!(result.stage2_count, 0);
        assert_eq!(result.rejected_count, 0);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_completed_counts() {
        let candidates = vec![candidate(1), candidate(2), candidate(3), candidate(4)];
        let approved = vec![candidate(1), candidate(3)];
        let result = AnalysisResult::completed("model-a", "model-b", candidates, approved);

        assert!(result.success);
        assert_eq!(result.stage1_count, 4);
        assert_eq!(result.stage2_count, 2);
        assert_eq!(result.rejected_count, 2);
    }

    #[test]
    fn test_partial_keeps_candidates() {
        let candidates = vec![candidate(1), candidate(2)];
        let result =
            AnalysisResult::partial("model-a", "model-b", candidates, "stage 2 unreachable");

        assert!(!result.success);
        assert_eq!(result.stage1_count, 2);
        assert_eq!(result.candidates.len(), 2);
        assert!(result.approved.is_empty());
        assert_eq!(result.error.as_deref(), Some("stage 2 unreachable"));
    }

    #[test]
    fn test_result_json_shape() {
        let result = AnalysisResult::completed(
            "model-a",
            "model-b",
            vec![candidate(1)],
            vec![candidate(1)],
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["stage1_model"], "model-a");
        assert_eq!(json["candidates"][0]["text"], "metaphor 1");
        assert_eq!(json["candidates"][0]["context"], "context 1");
        // No error key when the run succeeded
        assert!(json.get("error").is_none());
    }
}
