// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) on stderr
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = all records kept, 1 = some dropped, 2 = error)
//
// The resolution engine itself lives in batch/ and resolver/. This file is
// only the thin layer that reads the input file and writes the output file.
// =============================================================================

mod batch;
mod cli;
mod config;
mod error;
mod progress;
mod records;
mod resolver;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::EngineConfig;
use progress::{ConsoleProgress, LogProgress, ProgressSink};
use resolver::{resolve_id, HttpResolver, LINK_MARKERS};

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `--json` output on stdout stays clean.
// RUST_LOG overrides the default level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("link_uid_resolver=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = every record survived
//   Ok(1) = at least one record was dropped (or the link had no ID)
//   Err = the batch could not run
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Batch {
            input,
            output,
            field,
            concurrency,
            timeout_secs,
            progress_every,
            json,
            quiet,
        } => {
            let config = EngineConfig {
                link_field: field,
                concurrency,
                request_timeout: Duration::from_secs(timeout_secs),
                progress_every,
            };
            handle_batch(input, output, &config, json, quiet).await
        }
        Commands::Link { link, timeout_secs } => {
            handle_link(&link, Duration::from_secs(timeout_secs)).await
        }
    }
}

// Handles the 'batch' subcommand
async fn handle_batch(
    input: PathBuf,
    output: Option<PathBuf>,
    config: &EngineConfig,
    json: bool,
    quiet: bool,
) -> Result<i32> {
    let records = records::read_records(&input)?;
    let total = records.len();

    info!(
        input = %input.display(),
        records = total,
        field = %config.link_field,
        markers = ?LINK_MARKERS,
        "loaded batch"
    );

    let sink: Box<dyn ProgressSink> = if quiet {
        Box::new(LogProgress)
    } else {
        Box::new(ConsoleProgress)
    };

    let results = batch::resolve_batch(records, config, sink.as_ref())
        .await
        .context("batch aborted")?;

    let output = match output {
        Some(path) => path,
        None => records::default_output_path(chrono::Utc::now())?,
    };
    records::write_records(&output, &results)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    let dropped = total - results.len();
    eprintln!();
    eprintln!("📊 Summary:");
    eprintln!("   📂 Total: {}", total);
    eprintln!("   ✅ Extracted: {}", results.len());
    eprintln!("   ❌ Dropped: {}", dropped);
    eprintln!("   💾 Saved to {}", output.display());

    if dropped > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Handles the 'link' subcommand
//
// The resolver normalizes the link itself; an unusable link simply yields
// no ID, like any other failure.
async fn handle_link(link: &str, timeout: Duration) -> Result<i32> {
    let resolver = HttpResolver::new(timeout)?;

    match resolve_id(&resolver, link).await {
        Some(id) => {
            println!("{}", id);
            Ok(0)
        }
        None => {
            eprintln!("No profile ID found for {}", link.trim());
            Ok(1)
        }
    }
}
