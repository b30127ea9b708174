// src/error.rs
// =============================================================================
// Errors that can stop a whole batch.
//
// Per-link failures (timeouts, DNS errors, pages without an ID) are NOT here:
// they only drop the record and get logged. The only things allowed to abort
// a batch are a bad configuration and failing to build the connection pool.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The runner needs at least one slot to make progress
    #[error("concurrency must be at least 1 (got {0})")]
    InvalidConcurrency(usize),

    /// The HTTP client (and its connection pool) could not be created
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}
