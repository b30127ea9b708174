// src/config.rs
// =============================================================================
// Tunables for one resolution batch.
//
// These are fixed for the lifetime of a batch. The CLI fills them from flags
// or environment variables (see cli.rs); tests build them directly.
// =============================================================================

use std::time::Duration;

use crate::error::EngineError;

/// Field holding the profile link in each record
pub const DEFAULT_LINK_FIELD: &str = "username";

/// Simultaneous outstanding requests against the remote service
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Per-request timeout, covering redirects and body download
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Report progress after this many completions (and always on the last one)
pub const DEFAULT_PROGRESS_EVERY: usize = 5;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub link_field: String,
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub progress_every: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            link_field: DEFAULT_LINK_FIELD.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

impl EngineConfig {
    // Rejects settings the runner cannot work with
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.concurrency == 0 {
            return Err(EngineError::InvalidConcurrency(self.concurrency));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.link_field, "username");
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.progress_every, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_is_invalid() {
        let config = EngineConfig {
            concurrency: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConcurrency(0))
        ));
    }
}
