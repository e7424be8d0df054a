//! Tropos Storage Layer
//!
//! Implements the `SpeechStore` trait over SQLite. Speech documents carry
//! their analysis inline: the metaphor and candidate lists are stored as
//! JSON text columns alongside a processed flag, so the batch driver can
//! select unprocessed work and reporting can aggregate counts with plain
//! SQL.
//!
//! # Examples
//!
//! ```no_run
//! use tropos_store::SqliteSpeechStore;
//!
//! let store = SqliteSpeechStore::new("speeches.db").unwrap();
//! // Store is now ready for speech operations
//! ```

#![warn(missing_docs)]

use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use tropos_domain::traits::SpeechStore;
use tropos_domain::{AnalysisResult, ProcessingStats, Speech};

/// Method tag written with every saved analysis
const ANALYSIS_METHOD: &str = "two_stage_llm_v1";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON encoding of an analysis column failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Speech not found
    #[error("speech not found: {0}")]
    NotFound(i64),
}

/// Per-analysis statistics persisted as a JSON column
#[derive(Debug, Serialize)]
struct AnalysisStats<'a> {
    stage1_model: &'a str,
    stage2_model: &'a str,
    stage1_count: usize,
    stage2_count: usize,
    rejected_count: usize,
    processing_secs: f64,
}

/// SQLite-based implementation of `SpeechStore`
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// `SqliteSpeechStore` instance.
pub struct SqliteSpeechStore {
    conn: Connection,
}

impl SqliteSpeechStore {
    /// Open (or create) a store at the given database path.
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(store)
    }

    /// Insert a speech awaiting analysis, returning its id
    pub fn add_speech(
        &mut self,
        title: &str,
        speaker: &str,
        delivered_on: &str,
        body: &str,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO speeches (title, speaker, delivered_on, body)
             VALUES (?1, ?2, ?3, ?4)",
            params![title, speaker, delivered_on, body],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetch one speech by id
    pub fn get_speech(&self, id: i64) -> Result<Option<Speech>, StoreError> {
        let speech = self
            .conn
            .query_row(
                "SELECT id, title, speaker, delivered_on, body FROM speeches WHERE id = ?1",
                params![id],
                row_to_speech,
            )
            .optional()?;
        Ok(speech)
    }

    /// The stored approved-metaphor list for a processed speech
    pub fn saved_metaphors(&self, id: i64) -> Result<Vec<serde_json::Value>, StoreError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT analysis_metaphors FROM speeches WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))?;

        match json {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }
}

fn row_to_speech(row: &rusqlite::Row<'_>) -> rusqlite::Result<Speech> {
    Ok(Speech {
        id: row.get(0)?,
        title: row.get(1)?,
        speaker: row.get(2)?,
        delivered_on: row.get(3)?,
        body: row.get(4)?,
    })
}

impl SpeechStore for SqliteSpeechStore {
    type Error = StoreError;

    fn unprocessed_speeches(&self, limit: Option<usize>) -> Result<Vec<Speech>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, speaker, delivered_on, body
             FROM speeches WHERE processed = 0 ORDER BY id LIMIT ?1",
        )?;
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let speeches = stmt
            .query_map(params![limit], row_to_speech)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(speeches)
    }

    fn save_analysis(
        &mut self,
        speech_id: i64,
        result: &AnalysisResult,
        processing_time: Duration,
    ) -> Result<(), Self::Error> {
        let stats = AnalysisStats {
            stage1_model: &result.stage1_model,
            stage2_model: &result.stage2_model,
            stage1_count: result.stage1_count,
            stage2_count: result.stage2_count,
            rejected_count: result.rejected_count,
            processing_secs: processing_time.as_secs_f64(),
        };

        let updated = self.conn.execute(
            "UPDATE speeches SET
                processed = 1,
                processed_at = ?2,
                analysis_method = ?3,
                analysis_count = ?4,
                analysis_metaphors = ?5,
                analysis_candidates = ?6,
                analysis_stats = ?7
             WHERE id = ?1",
            params![
                speech_id,
                Local::now().to_rfc3339(),
                ANALYSIS_METHOD,
                result.approved.len() as i64,
                serde_json::to_string(&result.approved)?,
                serde_json::to_string(&result.candidates)?,
                serde_json::to_string(&stats)?,
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(speech_id));
        }

        debug!(
            speech_id,
            metaphors = result.approved.len(),
            "analysis saved"
        );
        Ok(())
    }

    fn statistics(&self) -> Result<ProcessingStats, Self::Error> {
        let total: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM speeches", [], |row| row.get(0))?;
        let processed: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM speeches WHERE processed = 1",
            [],
            |row| row.get(0),
        )?;

        Ok(ProcessingStats {
            total,
            processed,
            unprocessed: total - processed,
        })
    }

    fn processed_sample(&self, limit: usize) -> Result<Vec<(Speech, usize)>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, speaker, delivered_on, body, analysis_count
             FROM speeches WHERE processed = 1 ORDER BY id LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let speech = row_to_speech(row)?;
                let count: Option<i64> = row.get(5)?;
                Ok((speech, count.unwrap_or(0) as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
