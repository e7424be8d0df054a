//! Stored speech documents and processing statistics

use serde::{Deserialize, Serialize};

/// One speech document in the store.
///
/// The body carries the full text submitted to the pipeline; the remaining
/// fields are display metadata for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Speech {
    /// Store-assigned identifier
    pub id: i64,

    /// Speech title
    pub title: String,

    /// Speaker name
    pub speaker: String,

    /// Delivery date (free-form, as ingested)
    pub delivered_on: String,

    /// Full speech text
    pub body: String,
}

/// Aggregate processed/unprocessed counts for the store
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Total speeches in the store
    pub total: u64,

    /// Speeches that carry an analysis
    pub processed: u64,

    /// Speeches still awaiting analysis
    pub unprocessed: u64,
}

impl ProcessingStats {
    /// Fraction of speeches processed, as a percentage
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.processed as f64 / self.total as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        let stats = ProcessingStats {
            total: 200,
            processed: 50,
            unprocessed: 150,
        };
        assert!((stats.percentage() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_empty_store() {
        let stats = ProcessingStats {
            total: 0,
            processed: 0,
            unprocessed: 0,
        };
        assert_eq!(stats.percentage(), 0.0);
    }
}
