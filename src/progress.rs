// src/progress.rs
// =============================================================================
// Progress reporting for a running batch.
//
// The runner knows nothing about how progress is shown. It hands a
// ProgressSnapshot to whatever ProgressSink it was given:
// - ConsoleProgress: a text progress bar on stderr
// - LogProgress: one tracing line per snapshot
// - an mpsc sender: forwards snapshots to another task (a UI, a bot, ...)
//
// Reporting is best-effort. A sink may fail (closed channel, broken pipe);
// the runner logs that and keeps resolving.
// =============================================================================

use async_trait::async_trait;
use std::io::Write;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

/// Cells in the text progress bar; each cell is 5%
const BAR_WIDTH: usize = 20;

// A point-in-time view of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Jobs finished so far (resolved, dropped or passed through)
    pub completed: usize,
    /// Jobs in the batch
    pub total: usize,
    /// Records that made it into the output so far
    pub succeeded: usize,
}

impl ProgressSnapshot {
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 100;
        }
        self.completed * 100 / self.total
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress receiver has gone away")]
    Closed,

    #[error("failed to write progress: {0}")]
    Io(#[from] std::io::Error),
}

// Anything that can receive progress snapshots
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, snapshot: ProgressSnapshot) -> Result<(), ProgressError>;
}

/// Draws a text progress bar on stderr
pub struct ConsoleProgress;

#[async_trait]
impl ProgressSink for ConsoleProgress {
    async fn report(&self, snapshot: ProgressSnapshot) -> Result<(), ProgressError> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{}", render(&snapshot))?;
        Ok(())
    }
}

/// Emits each snapshot as a log line
pub struct LogProgress;

#[async_trait]
impl ProgressSink for LogProgress {
    async fn report(&self, snapshot: ProgressSnapshot) -> Result<(), ProgressError> {
        info!(
            completed = snapshot.completed,
            total = snapshot.total,
            succeeded = snapshot.succeeded,
            percent = snapshot.percent(),
            "batch progress"
        );
        Ok(())
    }
}

#[async_trait]
impl ProgressSink for UnboundedSender<ProgressSnapshot> {
    async fn report(&self, snapshot: ProgressSnapshot) -> Result<(), ProgressError> {
        self.send(snapshot).map_err(|_| ProgressError::Closed)
    }
}

// Renders a snapshot as a multi-line block:
//
//   Resolving links [████████░░░░░░░░░░░░] 40%
//     Total:     10
//     Extracted: 3
//     Remaining: 6
pub fn render(snapshot: &ProgressSnapshot) -> String {
    let percent = snapshot.percent();
    let filled = (percent / 5).min(BAR_WIDTH);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));

    format!(
        "Resolving links [{}] {}%\n  Total:     {}\n  Extracted: {}\n  Remaining: {}",
        bar,
        percent,
        snapshot.total,
        snapshot.succeeded,
        snapshot.remaining()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(completed: usize, total: usize, succeeded: usize) -> ProgressSnapshot {
        ProgressSnapshot {
            completed,
            total,
            succeeded,
        }
    }

    #[test]
    fn test_percent_rounds_down() {
        assert_eq!(snapshot(1, 3, 0).percent(), 33);
        assert_eq!(snapshot(3, 3, 0).percent(), 100);
        assert_eq!(snapshot(0, 0, 0).percent(), 100);
    }

    #[test]
    fn test_render_partial_bar() {
        let text = render(&snapshot(4, 10, 3));
        let first = text.lines().next().unwrap();
        assert_eq!(first, "Resolving links [████████░░░░░░░░░░░░] 40%");
        assert!(text.contains("Total:     10"));
        assert!(text.contains("Extracted: 3"));
        assert!(text.contains("Remaining: 6"));
    }

    #[test]
    fn test_render_full_bar() {
        let text = render(&snapshot(7, 7, 7));
        assert!(text.starts_with(&format!("Resolving links [{}] 100%", "█".repeat(20))));
        assert!(text.contains("Remaining: 0"));
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_and_reports_closed() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.report(snapshot(1, 2, 1)).await.unwrap();
        assert_eq!(rx.recv().await, Some(snapshot(1, 2, 1)));

        drop(rx);
        let err = tx.report(snapshot(2, 2, 1)).await.unwrap_err();
        assert!(matches!(err, ProgressError::Closed));
    }
}
