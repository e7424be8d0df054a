//! Import command implementation.

use crate::cli::ImportArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use serde::Deserialize;
use std::fs;
use tropos_store::SqliteSpeechStore;

/// One speech record in an import file.
#[derive(Debug, Deserialize)]
struct SpeechRecord {
    title: String,
    speaker: String,
    #[serde(alias = "date")]
    delivered_on: String,
    #[serde(alias = "text")]
    body: String,
}

/// Execute the import command: load a JSON array of speeches into the store.
pub fn execute_import(args: ImportArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let contents = fs::read_to_string(&args.file)?;
    let records: Vec<SpeechRecord> = serde_json::from_str(&contents)?;
    if records.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "no speeches found in {}",
            args.file
        )));
    }

    let mut store = SqliteSpeechStore::new(&config.db_path)?;
    for record in &records {
        store.add_speech(
            &record.title,
            &record.speaker,
            &record.delivered_on,
            &record.body,
        )?;
    }

    println!(
        "{}",
        formatter.success(&format!("imported {} speech(es)", records.len()))
    );
    Ok(())
}
