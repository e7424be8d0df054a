//! Stats command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use tropos_domain::traits::SpeechStore;
use tropos_store::SqliteSpeechStore;

/// How many processed speeches to show alongside the counts
const SAMPLE_SIZE: usize = 5;

/// Execute the stats command.
///
/// Reports store counts only; rate-limit usage lives in process memory and
/// is shown by the commands that actually spend requests.
pub fn execute_stats(config: &Config, formatter: &Formatter) -> Result<()> {
    let store = SqliteSpeechStore::new(&config.db_path)?;
    let stats = store.statistics()?;
    let sample = store.processed_sample(SAMPLE_SIZE)?;

    println!("{}", formatter.format_statistics(&stats, &sample)?);
    Ok(())
}
