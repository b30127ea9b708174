// src/batch/mod.rs
// =============================================================================
// This module resolves a whole batch of records.
//
// Submodules:
// - runner: The bounded, completion-ordered job runner
//
// resolve_batch() is the entry point the CLI uses. It owns the lifetime of
// the connection pool: built before the first job, dropped after the last.
// =============================================================================

mod runner;

use serde_json::{Map, Value};
use tracing::info;

pub use runner::{run, Job};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::progress::ProgressSink;
use crate::resolver::HttpResolver;

/// One input row: an arbitrary JSON object
pub type Record = Map<String, Value>;

// Resolves every eligible link in `records` over HTTP
//
// Returns: surviving records (resolved or passed through), in no
// particular order. Errors only if the batch cannot start at all.
pub async fn resolve_batch(
    records: Vec<Record>,
    config: &EngineConfig,
    sink: &dyn ProgressSink,
) -> Result<Vec<Record>, EngineError> {
    // Before the pool exists, so a bad config never opens a connection
    config.validate()?;

    let jobs: Vec<Job> = records
        .into_iter()
        .map(|record| Job::new(record, &config.link_field))
        .collect();

    if jobs.is_empty() {
        info!("empty batch, nothing to resolve");
        return Ok(Vec::new());
    }

    let resolver = HttpResolver::new(config.request_timeout)?;

    run(
        &resolver,
        jobs,
        &config.link_field,
        config.concurrency,
        config.progress_every,
        sink,
    )
    .await
    // resolver (and with it the pool) is dropped here
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{ProgressError, ProgressSnapshot};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingSink {
        snapshots: Mutex<Vec<ProgressSnapshot>>,
    }

    #[async_trait]
    impl ProgressSink for RecordingSink {
        async fn report(&self, snapshot: ProgressSnapshot) -> Result<(), ProgressError> {
            self.snapshots.lock().unwrap().push(snapshot);
            Ok(())
        }
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_resolves_share_links_against_a_live_server() {
        let server = MockServer::start().await;
        let profile = format!("{}/profile.php?id=100012345", server.uri());
        Mock::given(method("GET"))
            .and(path("/share/abc"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", profile.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/profile.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/share/vanity"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"<script>{"userID":"777"}</script>"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/share/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(1500))
                    .set_body_string(r#"{"userID":"1"}"#),
            )
            .mount(&server)
            .await;

        let input = vec![
            record(json!({"username": format!("{}/share/abc", server.uri()), "id": 1})),
            record(json!({"username": format!("{}/share/vanity", server.uri()), "id": 2})),
            record(json!({"username": format!("{}/share/slow", server.uri()), "id": 3})),
            record(json!({"username": "just text", "id": 4})),
        ];
        let config = EngineConfig {
            request_timeout: Duration::from_millis(300),
            ..EngineConfig::default()
        };
        let sink = RecordingSink::default();

        let mut out = resolve_batch(input, &config, &sink).await.unwrap();
        out.sort_by_key(|r| r["id"].as_i64());

        assert_eq!(
            out,
            vec![
                record(json!({"username": "100012345", "id": 1})),
                record(json!({"username": "777", "id": 2})),
                record(json!({"username": "just text", "id": 4})),
            ]
        );

        let snapshots = sink.snapshots.lock().unwrap();
        assert_eq!(
            snapshots.last(),
            Some(&ProgressSnapshot {
                completed: 4,
                total: 4,
                succeeded: 3
            })
        );
    }

    #[tokio::test]
    async fn test_custom_link_field() {
        let input = vec![record(json!({"username": "https://facebook.com/share/x", "profile": "n/a"}))];
        let config = EngineConfig {
            link_field: "profile".to_string(),
            ..EngineConfig::default()
        };
        let sink = RecordingSink::default();

        // "profile" holds no link, so nothing is fetched and the record survives
        let out = resolve_batch(input.clone(), &config, &sink).await.unwrap();
        assert_eq!(out, input);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_a_batch_error() {
        let input = vec![record(json!({"username": "x"}))];
        let config = EngineConfig {
            concurrency: 0,
            ..EngineConfig::default()
        };
        let sink = RecordingSink::default();

        let err = resolve_batch(input, &config, &sink).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidConcurrency(0)));
    }

    #[tokio::test]
    async fn test_config_is_checked_before_anything_else() {
        // Even an empty batch is refused, so no client is ever built
        let config = EngineConfig {
            concurrency: 0,
            ..EngineConfig::default()
        };
        let sink = RecordingSink::default();

        let err = resolve_batch(Vec::new(), &config, &sink).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidConcurrency(0)));
        assert!(sink.snapshots.lock().unwrap().is_empty());
    }
}
