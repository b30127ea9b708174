// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - batch: resolve every profile link in a JSON file
// - link: resolve one link and print its ID (handy for checking patterns)
//
// Every tunable has a flag AND an environment variable (the 'env' feature),
// so a deployment can fix them once instead of passing flags every time.
// =============================================================================

use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{
    DEFAULT_CONCURRENCY, DEFAULT_LINK_FIELD, DEFAULT_PROGRESS_EVERY, DEFAULT_TIMEOUT_SECS,
};

#[derive(Parser, Debug)]
#[command(
    name = "link-uid-resolver",
    version,
    about = "Resolve profile links in JSON records to numeric profile IDs",
    long_about = "link-uid-resolver reads a JSON list of records, follows every profile link it \
                  finds (share links, vanity URLs, profile.php links) and replaces it with the \
                  numeric profile ID. Records whose link cannot be resolved are dropped."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve every profile link in a JSON file
    ///
    /// Example: link-uid-resolver batch people.json --concurrency 8
    Batch {
        /// JSON file holding a list of objects
        input: PathBuf,

        /// Where to write the results (default: FB_Converted_<timestamp>.json)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Field holding the profile link
        #[arg(long, env = "RESOLVER_FIELD", default_value = DEFAULT_LINK_FIELD)]
        field: String,

        /// Maximum requests in flight at once
        #[arg(
            long,
            env = "RESOLVER_CONCURRENCY",
            default_value_t = DEFAULT_CONCURRENCY,
            value_parser = clap::value_parser!(u16).range(1..).map(usize::from)
        )]
        concurrency: usize,

        /// Per-request timeout in seconds
        #[arg(long, env = "RESOLVER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,

        /// Report progress every N completed records
        #[arg(long, env = "RESOLVER_PROGRESS_EVERY", default_value_t = DEFAULT_PROGRESS_EVERY)]
        progress_every: usize,

        /// Also print the results as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Log progress lines instead of drawing a progress bar
        #[arg(long, short)]
        quiet: bool,
    },

    /// Resolve a single link and print its profile ID
    ///
    /// Example: link-uid-resolver link https://www.facebook.com/share/abc123
    Link {
        /// The profile or share link
        link: String,

        /// Per-request timeout in seconds
        #[arg(long, env = "RESOLVER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
    },
}
