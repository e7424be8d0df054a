//! Tropos CLI - Two-stage conceptual metaphor analysis over stored speeches.

use clap::Parser;
use std::path::Path;
use tropos_cli::commands;
use tropos_cli::{Cli, Command, Config, Formatter};

fn main() {
    // Log to stderr so JSON output on stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> tropos_cli::Result<()> {
    let cli = Cli::parse();

    // Load or create config
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from(Path::new(path))?,
        None => Config::load().unwrap_or_else(|_| {
            let cfg = Config::default();
            cfg.save().ok();
            cfg
        }),
    };

    // Override database path if specified
    if let Some(db) = cli.db {
        config.db_path = db.into();
    }

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Analyze(args) => commands::execute_analyze(args, &config, &formatter),
        Command::Batch(args) => commands::execute_batch(args, &config, &formatter),
        Command::Stats => commands::execute_stats(&config, &formatter),
        Command::Import(args) => commands::execute_import(args, &config, &formatter),
    }
}
