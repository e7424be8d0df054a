//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Tropos CLI - Two-stage conceptual metaphor analysis over stored speeches.
#[derive(Debug, Parser)]
#[command(name = "tropos")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Database file path (overrides the configured path)
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Human-readable format (default)
    Plain,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a single text without touching the store
    Analyze(AnalyzeArgs),

    /// Analyze unprocessed speeches from the store
    Batch(BatchArgs),

    /// Show processing statistics for the store
    Stats,

    /// Import speeches from a JSON file into the store
    Import(ImportArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Text to analyze
    #[arg(short, long)]
    pub text: Option<String>,

    /// Read the text from a file (stdin when neither flag is given)
    #[arg(short = 'i', long)]
    pub file: Option<String>,
}

/// Arguments for the batch command.
#[derive(Debug, Parser)]
pub struct BatchArgs {
    /// Maximum number of speeches to process in this run
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// JSON file containing an array of speeches
    #[arg(short = 'i', long)]
    pub file: String,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Plain => crate::config::OutputFormat::Plain,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
