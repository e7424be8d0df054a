//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::commands::build_analyzer;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;
use std::io::Read;
use std::time::Instant;

/// Execute the analyze command: run the two-stage pipeline over one text
/// and print the result. Nothing is written to the store.
pub fn execute_analyze(args: AnalyzeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = read_text(args)?;
    if text.trim().is_empty() {
        return Err(CliError::InvalidInput("no text to analyze".into()));
    }

    let analyzer = build_analyzer(config)?;

    let started = Instant::now();
    let result = analyzer.run_pipeline(&text);
    let elapsed = started.elapsed();

    println!("{}", formatter.format_analysis(&result)?);

    if !formatter.is_json() {
        println!(
            "{}",
            formatter.info(&format!("completed in {:.1}s", elapsed.as_secs_f64()))
        );
        println!("{}", formatter.format_usage(&analyzer.usage_summary())?);
    }

    Ok(())
}

fn read_text(args: AnalyzeArgs) -> Result<String> {
    match (args.text, args.file) {
        (Some(text), None) => Ok(text),
        (None, Some(path)) => Ok(fs::read_to_string(path)?),
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        (Some(_), Some(_)) => Err(CliError::InvalidInput(
            "pass either --text or --file, not both".into(),
        )),
    }
}
