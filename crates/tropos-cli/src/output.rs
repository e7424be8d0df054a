//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use tropos_domain::{AnalysisResult, ProcessingStats, Speech};
use tropos_limiter::UsageSummary;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Whether the formatter emits JSON.
    ///
    /// Commands use this to suppress decorative progress lines that would
    /// corrupt machine-readable output.
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Format an analysis result.
    pub fn format_analysis(&self, result: &AnalysisResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Plain => Ok(self.format_analysis_plain(result)),
        }
    }

    fn format_analysis_plain(&self, result: &AnalysisResult) -> String {
        let mut lines = Vec::new();

        if !result.success {
            lines.push(self.error(&format!(
                "analysis failed: {}",
                result.error.as_deref().unwrap_or("unknown error")
            )));
        }

        lines.push(format!(
            "Stage 1 ({}): {} candidate(s) detected",
            result.stage1_model, result.stage1_count
        ));
        lines.push(format!(
            "Stage 2 ({}): {} approved, {} rejected",
            result.stage2_model, result.stage2_count, result.rejected_count
        ));

        if !result.approved.is_empty() {
            lines.push(String::new());
            lines.push(self.colorize("Metaphors:", "cyan"));
            for (i, metaphor) in result.approved.iter().enumerate() {
                lines.push(format!(
                    "  {}. {} ({})",
                    i + 1,
                    self.colorize(&metaphor.text, "green"),
                    metaphor.context
                ));
            }
        }

        lines.join("\n")
    }

    /// Format store statistics with a sample of processed speeches.
    pub fn format_statistics(
        &self,
        stats: &ProcessingStats,
        sample: &[(Speech, usize)],
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "total": stats.total,
                    "processed": stats.processed,
                    "unprocessed": stats.unprocessed,
                    "percentage": stats.percentage(),
                    "sample": sample
                        .iter()
                        .map(|(speech, count)| {
                            serde_json::json!({
                                "id": speech.id,
                                "title": speech.title,
                                "speaker": speech.speaker,
                                "metaphors": count,
                            })
                        })
                        .collect::<Vec<_>>(),
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Plain => {
                let mut lines = vec![format!(
                    "Speeches: {} total, {} processed ({:.1}%), {} remaining",
                    stats.total,
                    stats.processed,
                    stats.percentage(),
                    stats.unprocessed
                )];
                if !sample.is_empty() {
                    lines.push(String::new());
                    lines.push(self.colorize("Recently processed:", "cyan"));
                    for (speech, count) in sample {
                        lines.push(format!(
                            "  #{} {} ({}): {} metaphor(s)",
                            speech.id, speech.title, speech.speaker, count
                        ));
                    }
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format the rate limiter's usage summary.
    pub fn format_usage(&self, usage: &UsageSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(usage)?),
            OutputFormat::Plain => {
                let mut lines = vec![format!(
                    "Requests: {}/{} this minute, {}/{} today",
                    usage.rpm_used, usage.rpm_limit, usage.rpd_used, usage.rpd_limit
                )];
                for (model, count) in &usage.by_model {
                    lines.push(format!("  {}: {} request(s)", model, count));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tropos_domain::MetaphorCandidate;

    fn sample_result() -> AnalysisResult {
        AnalysisResult::completed(
            "gemini-2.0-flash",
            "gemini-2.5-flash",
            vec![
                MetaphorCandidate::new("headwinds", "facing strong headwinds"),
                MetaphorCandidate::new("anchor", "anchor expectations"),
            ],
            vec![MetaphorCandidate::new("headwinds", "facing strong headwinds")],
        )
    }

    #[test]
    fn test_plain_analysis_output() {
        let formatter = Formatter::new(OutputFormat::Plain, false);
        let output = formatter.format_analysis(&sample_result()).unwrap();
        assert!(output.contains("2 candidate(s) detected"));
        assert!(output.contains("1 approved, 1 rejected"));
        assert!(output.contains("headwinds"));
        assert!(!output.contains("anchor expectations"));
    }

    #[test]
    fn test_json_analysis_output() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_analysis(&sample_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["stage1_count"], 2);
        assert_eq!(value["approved"][0]["text"], "headwinds");
    }

    #[test]
    fn test_failed_analysis_output() {
        let result = AnalysisResult::failed("a", "b", "stage 1 error: boom");
        let formatter = Formatter::new(OutputFormat::Plain, false);
        let output = formatter.format_analysis(&result).unwrap();
        assert!(output.contains("analysis failed"));
        assert!(output.contains("boom"));
    }

    #[test]
    fn test_statistics_output() {
        let stats = ProcessingStats {
            total: 10,
            processed: 4,
            unprocessed: 6,
        };
        let formatter = Formatter::new(OutputFormat::Plain, false);
        let output = formatter.format_statistics(&stats, &[]).unwrap();
        assert!(output.contains("10 total"));
        assert!(output.contains("40.0%"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Plain, false);
        assert_eq!(formatter.success("done"), "✓ done");
    }
}
