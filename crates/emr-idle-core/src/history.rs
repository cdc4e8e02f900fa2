//! MapReduce job history (`.jhist`) parsing and per-file reduction.
//!
//! A history file is one JSON value per line (Avro-JSON encoding):
//!
//! ```text
//! Avro-Json
//! {"type":"record","name":"Event",...}
//! {"type":"JOB_SUBMITTED","event":{"org.apache.hadoop.mapreduce.jobhistory.JobSubmitted":{"jobid":"job_1_0001","jobName":"wordcount","submitTime":1577836800000,...}}}
//! {"type":"JOB_FINISHED","event":{"org.apache.hadoop.mapreduce.jobhistory.JobFinished":{"finishTime":1577836900000,...}}}
//! ```
//!
//! Every line is parsed on its own. The header and anything else that is
//! not JSON is skipped; only submitted/finished events feed the reduction.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::WorkInterval;

pub const JOB_SUBMITTED: &str = "JOB_SUBMITTED";
pub const JOB_FINISHED: &str = "JOB_FINISHED";

const SUBMITTED_RECORD: &str = "org.apache.hadoop.mapreduce.jobhistory.JobSubmitted";
const FINISHED_RECORD: &str = "org.apache.hadoop.mapreduce.jobhistory.JobFinished";

/// The events the reduction cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    Submitted {
        job_id: String,
        job_name: String,
        submit_time: i64,
    },
    Finished {
        finish_time: i64,
    },
    /// Any other record, including the schema line.
    Other,
}

#[derive(Debug, Error)]
pub enum HistoryParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("{event} event is missing '{field}'")]
    MissingField {
        event: &'static str,
        field: &'static str,
    },
}

/// Parse a single history line.
pub fn parse_event(line: &str) -> Result<HistoryEvent, HistoryParseError> {
    let root: Value = serde_json::from_str(line)?;

    match root.get("type").and_then(Value::as_str) {
        Some(JOB_SUBMITTED) => {
            let payload = payload(&root, SUBMITTED_RECORD);
            Ok(HistoryEvent::Submitted {
                job_id: text_field(payload, JOB_SUBMITTED, "jobid")?,
                job_name: text_field(payload, JOB_SUBMITTED, "jobName")?,
                submit_time: millis_field(payload, JOB_SUBMITTED, "submitTime")?,
            })
        }
        Some(JOB_FINISHED) => {
            let payload = payload(&root, FINISHED_RECORD);
            Ok(HistoryEvent::Finished {
                finish_time: millis_field(payload, JOB_FINISHED, "finishTime")?,
            })
        }
        _ => Ok(HistoryEvent::Other),
    }
}

fn payload<'a>(root: &'a Value, record: &str) -> Option<&'a Value> {
    root.get("event").and_then(|e| e.get(record))
}

fn text_field(
    payload: Option<&Value>,
    event: &'static str,
    field: &'static str,
) -> Result<String, HistoryParseError> {
    match payload.and_then(|p| p.get(field)) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(HistoryParseError::MissingField { event, field }),
        Some(other) => Ok(other.to_string()),
    }
}

/// Timestamps are numbers in practice; numeric strings are accepted too.
fn millis_field(
    payload: Option<&Value>,
    event: &'static str,
    field: &'static str,
) -> Result<i64, HistoryParseError> {
    let value = payload.and_then(|p| p.get(field));
    value
        .and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .ok_or(HistoryParseError::MissingField { event, field })
}

/// What to do with a file whose submit or finish time never appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsetTimestampPolicy {
    /// Emit the interval with the missing timestamp as 0.
    #[default]
    Zero,
    /// Leave the file out of the timeline.
    Skip,
}

/// Per-file reduction state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobHistoryAccumulator {
    pub id: String,
    pub label: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
    /// Lines that were not JSON or lacked required fields.
    pub skipped_lines: usize,
}

impl JobHistoryAccumulator {
    /// Fold one event in. Repeated submissions overwrite earlier ones.
    pub fn apply(mut self, event: HistoryEvent) -> Self {
        match event {
            HistoryEvent::Submitted {
                job_id,
                job_name,
                submit_time,
            } => {
                self.id = job_id;
                self.label = job_name;
                self.start = Some(submit_time);
            }
            HistoryEvent::Finished { finish_time } => {
                self.end = Some(finish_time);
            }
            HistoryEvent::Other => {}
        }
        self
    }

    fn skip(mut self) -> Self {
        self.skipped_lines += 1;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Resolve unset timestamps and produce the file's interval.
    pub fn into_interval(self, policy: UnsetTimestampPolicy) -> Option<WorkInterval> {
        if !self.is_complete() {
            match policy {
                UnsetTimestampPolicy::Skip => return None,
                UnsetTimestampPolicy::Zero => {}
            }
        }
        Some(WorkInterval::new(
            self.id,
            self.label,
            self.start.unwrap_or(0),
            self.end.unwrap_or(0),
        ))
    }
}

fn trim_newline(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

/// Iterator over the lines of a decompressed history file.
///
/// Yields `(line_number, line)` with line numbers 1-indexed. Invalid
/// UTF-8 is replaced. An I/O error (truncated or corrupt gzip) is yielded
/// once and ends the iteration.
pub struct HistoryLines<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
    failed: bool,
}

impl<R: BufRead> HistoryLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            line_number: 0,
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for HistoryLines<R> {
    type Item = std::io::Result<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                let line = String::from_utf8_lossy(&self.buffer);
                Some(Ok((self.line_number, trim_newline(&line).to_string())))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Reduce a whole history file.
///
/// `source` only names the file in log messages. Bad lines are skipped;
/// a read error stops the file but keeps what was reduced so far.
pub fn reduce_history<R: BufRead>(reader: R, source: &str) -> JobHistoryAccumulator {
    let mut acc = JobHistoryAccumulator::default();

    for item in HistoryLines::new(reader) {
        let (line_number, line) = match item {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(file = source, error = %e, "stopped reading job history file");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        acc = match parse_event(&line) {
            Ok(event) => acc.apply(event),
            Err(e @ HistoryParseError::InvalidJson(_)) => {
                tracing::debug!(file = source, line = line_number, error = %e, "skipping unparseable line");
                acc.skip()
            }
            Err(e) => {
                tracing::warn!(file = source, line = line_number, error = %e, "skipping malformed event");
                acc.skip()
            }
        };
    }

    acc
}
