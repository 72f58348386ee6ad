//! Runner — drives a record stream through the handler.
//!
//! Each record becomes its own blocking task, so records are handled
//! concurrently and reported in completion order, not offset order. At most
//! `max_in_flight` tasks run at once; the stream is not polled past that.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::StreamExt;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

use crate::error::HostError;
use crate::host::record::OutputLine;
use crate::host::source::RecordStream;
use crate::pipeline::handler::EventHandler;
use crate::pipeline::types::EventRecord;

/// Default cap on concurrently handled records.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub handled: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.handled + self.failed
    }

    fn record(&mut self, line: &OutputLine) {
        if line.is_ok() {
            self.handled += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// `run_with_limit` with `DEFAULT_MAX_IN_FLIGHT`.
pub async fn run<F>(
    handler: Arc<EventHandler>,
    records: RecordStream,
    emit: F,
) -> Result<RunSummary, HostError>
where
    F: FnMut(&OutputLine) -> Result<(), HostError>,
{
    run_with_limit(handler, records, DEFAULT_MAX_IN_FLIGHT, emit).await
}

/// Consume `records`, handing each one to `handler`, and pass every outcome
/// to `emit` as it completes.
///
/// A failed record (bad input, pipeline error, panicking task) is reported
/// and the run goes on. A stream IO error or an `emit` error ends the run.
pub async fn run_with_limit<F>(
    handler: Arc<EventHandler>,
    mut records: RecordStream,
    max_in_flight: usize,
    mut emit: F,
) -> Result<RunSummary, HostError>
where
    F: FnMut(&OutputLine) -> Result<(), HostError>,
{
    let limit = max_in_flight.max(1);
    let mut summary = RunSummary::default();
    let mut tasks: JoinSet<OutputLine> = JoinSet::new();

    while let Some(item) = records.next().await {
        match item {
            Ok(record) => {
                while tasks.len() >= limit {
                    debug!(in_flight = tasks.len(), "At capacity, waiting for a task");
                    match tasks.join_next().await {
                        Some(joined) => report(joined, &mut summary, &mut emit)?,
                        None => break,
                    }
                }
                let handler = Arc::clone(&handler);
                tasks.spawn_blocking(move || invoke(&handler, record));
            }
            Err(HostError::Io(e)) => {
                // Drain in-flight work before giving up.
                finish(&mut tasks, &mut summary, &mut emit).await?;
                return Err(HostError::Io(e));
            }
            Err(e) => {
                error!(error = %e, "Skipping invalid event record");
                let line = OutputLine::invalid(&e);
                summary.record(&line);
                emit(&line)?;
            }
        }

        while let Some(joined) = tasks.try_join_next() {
            report(joined, &mut summary, &mut emit)?;
        }
    }

    finish(&mut tasks, &mut summary, &mut emit).await?;

    info!(
        handled = summary.handled,
        failed = summary.failed,
        total = summary.total(),
        "Run complete"
    );
    Ok(summary)
}

/// Handle one record. A panic inside the handler becomes a failed line that
/// still carries the record's coordinates.
fn invoke(handler: &EventHandler, record: EventRecord) -> OutputLine {
    let handled = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&record)));
    match handled {
        Ok(result) => {
            OutputLine::from_result(record.topic, record.partition, record.offset, &result)
        }
        Err(payload) => {
            let err = HostError::Task(panic_message(payload.as_ref()));
            error!(
                topic = %record.topic,
                partition = record.partition,
                offset = record.offset,
                error = %err,
                "Handler panicked"
            );
            OutputLine::task_failed(&err).at(record.topic, record.partition, record.offset)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

async fn finish<F>(
    tasks: &mut JoinSet<OutputLine>,
    summary: &mut RunSummary,
    emit: &mut F,
) -> Result<(), HostError>
where
    F: FnMut(&OutputLine) -> Result<(), HostError>,
{
    while let Some(joined) = tasks.join_next().await {
        report(joined, summary, emit)?;
    }
    Ok(())
}

fn report<F>(
    joined: Result<OutputLine, JoinError>,
    summary: &mut RunSummary,
    emit: &mut F,
) -> Result<(), HostError>
where
    F: FnMut(&OutputLine) -> Result<(), HostError>,
{
    let line = joined.unwrap_or_else(|e| {
        let err = HostError::Task(e.to_string());
        error!(error = %err, "Worker task lost");
        OutputLine::task_failed(&err)
    });
    summary.record(&line);
    emit(&line)
}
