//! Local host adapter.
//!
//! Stands in for the hosting platform: reads event records, invokes the
//! handler once per record and reports each outcome. The pipeline does not
//! depend on anything in here.

pub mod record;
pub mod runner;
pub mod source;

pub use record::{HostPayload, HostRecord, OutputLine, OutputStatus, parse_line};
pub use runner::{DEFAULT_MAX_IN_FLIGHT, RunSummary, run, run_with_limit};
pub use source::{EventSource, FileSource, RecordStream, StdinSource};
