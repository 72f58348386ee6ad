//! Event sources — where the host adapter gets records from.

use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use futures::stream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::error::HostError;
use crate::host::record::parse_line;
use crate::pipeline::types::EventRecord;

/// Stream of parsed records. A bad line (including one that is not UTF-8)
/// yields an error item and the stream continues; an IO error ends it.
pub type RecordStream = Pin<Box<dyn Stream<Item = Result<EventRecord, HostError>> + Send>>;

/// Trait for record sources — pure I/O, no business logic.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Source name (e.g. "stdin", "file").
    fn name(&self) -> &str;

    /// Open the source and start streaming records.
    async fn start(&self) -> Result<RecordStream, HostError>;
}

/// Reads NDJSON records from stdin until EOF.
pub struct StdinSource;

impl StdinSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSource for StdinSource {
    fn name(&self) -> &str {
        "stdin"
    }

    async fn start(&self) -> Result<RecordStream, HostError> {
        Ok(record_stream(BufReader::new(tokio::io::stdin())))
    }
}

/// Reads NDJSON records from a file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EventSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn start(&self) -> Result<RecordStream, HostError> {
        let file = tokio::fs::File::open(&self.path).await?;
        tracing::info!(path = %self.path.display(), "Reading event records from file");
        Ok(record_stream(BufReader::new(file)))
    }
}

/// Turn a line reader into a record stream. Blank lines are skipped.
///
/// Lines are read as raw bytes so one undecodable line is reported on its
/// own instead of failing the reader.
pub fn record_stream<R>(reader: R) -> RecordStream
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let state: Option<(R, usize)> = Some((reader, 0));

    let stream = stream::unfold(state, |state| async move {
        let (mut reader, mut line_no) = state?;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            line_no += 1;
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => return None,
                Ok(_) => {
                    let Some(item) = parse_bytes(&buf, line_no) else {
                        continue;
                    };
                    return Some((item, Some((reader, line_no))));
                }
                Err(e) => {
                    tracing::error!(line = line_no, "Error reading event records: {}", e);
                    return Some((Err(HostError::Io(e)), None));
                }
            }
        }
    });

    Box::pin(stream)
}

/// `None` for a blank line.
fn parse_bytes(bytes: &[u8], line_no: usize) -> Option<Result<EventRecord, HostError>> {
    let line = match std::str::from_utf8(bytes) {
        Ok(line) => line,
        Err(e) => {
            return Some(Err(HostError::InvalidRecord {
                line: line_no,
                reason: format!("invalid UTF-8 at byte {}", e.valid_up_to()),
            }));
        }
    };
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return None;
    }
    Some(parse_line(line, line_no))
}
