//! Batch command implementation.

use crate::cli::BatchArgs;
use crate::commands::build_analyzer;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::time::Instant;
use tracing::{info, warn};
use tropos_domain::traits::SpeechStore;
use tropos_store::SqliteSpeechStore;

/// Bodies shorter than this are not worth a budgeted model call
const MIN_BODY_CHARS: usize = 100;

/// Progress line cadence
const PROGRESS_EVERY: usize = 5;

/// Each speech costs two budgeted requests (detection plus validation)
const REQUESTS_PER_SPEECH: u32 = 2;

/// Execute the batch command: analyze unprocessed speeches from the store,
/// bounded by the daily budget, and persist each successful result.
pub fn execute_batch(args: BatchArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = SqliteSpeechStore::new(&config.db_path)?;

    let stats = store.statistics()?;
    println!(
        "{}",
        formatter.info(&format!(
            "store: {} speeches, {} processed ({:.1}%), {} remaining",
            stats.total,
            stats.processed,
            stats.percentage(),
            stats.unprocessed
        ))
    );

    let analyzer = build_analyzer(config)?;

    let usage = analyzer.usage_summary();
    let affordable =
        (usage.rpd_limit.saturating_sub(usage.rpd_used) / REQUESTS_PER_SPEECH) as usize;
    if affordable == 0 {
        println!(
            "{}",
            formatter.warning("daily request budget exhausted, nothing can be processed today")
        );
        return Ok(());
    }

    let mut limit = affordable.min(config.max_speeches_per_run);
    if let Some(requested) = args.limit {
        limit = limit.min(requested);
    }

    let speeches = store.unprocessed_speeches(Some(limit))?;
    if speeches.is_empty() {
        println!("{}", formatter.info("no unprocessed speeches"));
        return Ok(());
    }

    println!(
        "{}",
        formatter.info(&format!(
            "processing {} speech(es) (budget allows {})",
            speeches.len(),
            affordable
        ))
    );

    let mut processed = 0usize;
    let mut failed = 0usize;
    let mut skipped = 0usize;

    for (i, speech) in speeches.iter().enumerate() {
        if speech.body.trim().len() < MIN_BODY_CHARS {
            warn!(speech_id = speech.id, "body too short, skipping");
            skipped += 1;
            continue;
        }

        let usage = analyzer.usage_summary();
        if usage.rpd_limit.saturating_sub(usage.rpd_used) < REQUESTS_PER_SPEECH {
            println!(
                "{}",
                formatter.warning("daily request budget exhausted, stopping early")
            );
            break;
        }

        info!(speech_id = speech.id, title = %speech.title, "analyzing speech");
        let started = Instant::now();
        let result = analyzer.run_pipeline(&speech.body);
        let elapsed = started.elapsed();

        if result.success {
            store.save_analysis(speech.id, &result, elapsed)?;
            processed += 1;
            println!(
                "{}",
                formatter.success(&format!(
                    "#{} {}: {} metaphor(s) in {:.1}s",
                    speech.id,
                    speech.title,
                    result.approved.len(),
                    elapsed.as_secs_f64()
                ))
            );
        } else {
            failed += 1;
            println!(
                "{}",
                formatter.error(&format!(
                    "#{} failed: {}",
                    speech.id,
                    result.error.as_deref().unwrap_or("unknown error")
                ))
            );
        }

        let done = i + 1;
        if done % PROGRESS_EVERY == 0 && done < speeches.len() {
            println!(
                "{}",
                formatter.info(&format!("progress: {}/{}", done, speeches.len()))
            );
        }
    }

    println!(
        "{}",
        formatter.success(&format!(
            "batch complete: {} processed, {} failed, {} skipped",
            processed, failed, skipped
        ))
    );

    let final_stats = store.statistics()?;
    println!("{}", formatter.format_statistics(&final_stats, &[])?);
    println!("{}", formatter.format_usage(&analyzer.usage_summary())?);

    Ok(())
}
