// src/batch/runner.rs
// =============================================================================
// The bounded job runner.
//
// How it works:
// 1. Every record becomes a Job at batch start (eligible or not)
// 2. Jobs are fed into a stream with buffer_unordered(concurrency), which
//    keeps exactly `concurrency` jobs in flight until the list runs dry
// 3. Results are taken in COMPLETION order. A slow link never holds back
//    the ones behind it, so the output order is not the input order
// 4. Every `progress_every` completions, and on the last one, a snapshot
//    is queued for the progress sink. A separate future drains the queue,
//    so a slow sink never stops new jobs from starting. Sink errors are
//    logged and ignored
//
// A failed job (network error, no ID on the page) only drops its own
// record. run() never fails because of a single job.
// =============================================================================

use futures::future;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use serde_json::Value;
use tracing::{debug, info};

use super::Record;
use crate::error::EngineError;
use crate::progress::{ProgressSink, ProgressSnapshot};
use crate::resolver::{eligible_link, resolve_id, LinkResolver};

// One unit of work: a record and, if it has one, the link to resolve
//
// The job owns its record outright. No two jobs share anything mutable.
#[derive(Debug, Clone)]
pub struct Job {
    record: Record,
    link: Option<String>,
}

impl Job {
    // Builds a job from a record, checking the link field for eligibility
    pub fn new(record: Record, link_field: &str) -> Self {
        let link = eligible_link(record.get(link_field)).map(str::to_string);
        Self { record, link }
    }

    pub fn is_eligible(&self) -> bool {
        self.link.is_some()
    }
}

// Runs every job and returns the surviving records
//
// Parameters:
//   resolver: how links are fetched (HTTP in production, a stub in tests)
//   jobs: one per input record
//   link_field: the field overwritten with the resolved ID
//   concurrency: maximum jobs in flight, must be >= 1
//   progress_every: snapshot cadence; 0 is treated as 1
//   sink: where snapshots go
//
// Returns: surviving records in completion order
pub async fn run<R>(
    resolver: &R,
    jobs: Vec<Job>,
    link_field: &str,
    concurrency: usize,
    progress_every: usize,
    sink: &dyn ProgressSink,
) -> Result<Vec<Record>, EngineError>
where
    R: LinkResolver + ?Sized,
{
    if concurrency == 0 {
        return Err(EngineError::InvalidConcurrency(concurrency));
    }
    let progress_every = progress_every.max(1);

    let total = jobs.len();
    let eligible = jobs.iter().filter(|job| job.is_eligible()).count();
    info!(total, eligible, concurrency, "starting batch");

    let mut outcomes = stream::iter(jobs)
        .map(|job| run_job(resolver, job, link_field))
        .buffer_unordered(concurrency);

    // Snapshots travel over a channel so a slow sink never stalls the
    // stream: jobs keep being admitted while a report is pending.
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<ProgressSnapshot>();

    let resolve = async move {
        let mut results = Vec::with_capacity(total);
        let mut completed = 0;

        while let Some(outcome) = outcomes.next().await {
            completed += 1;
            if let Some(record) = outcome {
                results.push(record);
            }

            if completed % progress_every == 0 || completed == total {
                let snapshot = ProgressSnapshot {
                    completed,
                    total,
                    succeeded: results.len(),
                };
                // The receiver lives until this future is done
                let _ = progress_tx.send(snapshot);
            }
        }

        drop(progress_tx);
        results
    };

    let report = async {
        while let Some(snapshot) = progress_rx.recv().await {
            if let Err(e) = sink.report(snapshot).await {
                debug!(error = %e, "progress update dropped");
            }
        }
    };

    let (results, ()) = future::join(resolve, report).await;

    info!(
        total,
        kept = results.len(),
        dropped = total - results.len(),
        "batch finished"
    );
    Ok(results)
}

// Runs one job to completion
//
// Ineligible jobs come straight back. Eligible jobs come back with the link
// field replaced by the ID, or not at all.
async fn run_job<R>(resolver: &R, job: Job, link_field: &str) -> Option<Record>
where
    R: LinkResolver + ?Sized,
{
    let Job { mut record, link } = job;

    let Some(link) = link else {
        return Some(record);
    };

    let id = resolve_id(resolver, &link).await?;
    record.insert(link_field.to_string(), Value::String(id));
    Some(record)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why buffer_unordered and not buffered?
//    - buffered(N) yields results in input order, so one slow link at the
//      front would hold back every finished job behind it
//    - buffer_unordered(N) yields whatever finishes first
//
// 2. Why is the snapshot built fresh each time?
//    - completed and results.len() are the only source of truth
//    - Nothing else is counted, so the numbers can never drift apart
//
// 3. Why a channel between the loop and the sink?
//    - Awaiting the sink inside the loop would stop polling the stream
//    - While nobody polls it, buffer_unordered starts no new jobs
//    - future::join drives both halves on the same task, no spawn needed
//
// 4. What does `let Some(link) = link else { ... }` do?
//    - It's let-else: bind the value if the pattern matches,
//      otherwise run the else block (which must return)
// -----------------------------------------------------------------------------
