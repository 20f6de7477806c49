//! Single-file extraction: streaming parse + filter -> measurement records.
//!
//! This is the pipeline's unit of isolation. One file's structural failure
//! is reported as a [`FileError`] and never aborts the surrounding batch.

use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;

use crate::filter::RecordFilter;
use crate::pmxml::{MeasInfoScope, PmStreamer, PmXmlError, RawValue, ValueSet};
use crate::record::MeasurementRecord;

/// Per-file failure, partitioned for the dispatcher's status map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
pub enum FileError {
    /// Structural XML violation or schema-index mismatch.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// File unreadable.
    #[error("I/O failure: {0}")]
    Io(String),
}

impl From<PmXmlError> for FileError {
    fn from(err: PmXmlError) -> Self {
        if err.is_io() {
            FileError::Io(err.to_string())
        } else {
            FileError::Malformed(err.to_string())
        }
    }
}

/// Extract the filtered record sequence for one file, fully materialized
/// in document order.
pub fn extract_file(path: &Path, filter: &RecordFilter) -> Result<Vec<MeasurementRecord>, FileError> {
    let stream = RecordStream::open(path, filter.clone())?;
    let records = stream.collect::<Result<Vec<_>, _>>()?;
    debug!("{}: {} records after filter", path.display(), records.len());
    Ok(records)
}

/// Lazy, restartable record sequence for one file.
///
/// Yields each surviving record exactly once, in document order. Re-opening
/// the same path restarts the sequence from the beginning; sinks that prefer
/// incremental consumption drive this directly instead of
/// [`extract_file`].
pub struct RecordStream {
    streamer: PmStreamer<BufReader<File>>,
    filter: RecordFilter,
    source: String,
    pending: VecDeque<MeasurementRecord>,
    failed: bool,
}

impl RecordStream {
    /// Open a PM file and position the stream before its first record.
    pub fn open(path: &Path, filter: RecordFilter) -> Result<Self, FileError> {
        let mut streamer = PmStreamer::open(path)?;
        streamer.read_header()?;
        Ok(Self {
            streamer,
            filter,
            source: path.display().to_string(),
            pending: VecDeque::new(),
            failed: false,
        })
    }

    /// Flatten one value set into records, applying the filter before any
    /// record is allocated.
    fn flatten(&mut self, value_set: ValueSet) {
        let scope = &value_set.scope;
        if !self.filter.admits_block(&scope.meas_info_id)
            || !self.filter.admits_instance(&value_set.obj_ldn)
        {
            return;
        }

        let collection_start = self.streamer.metadata().collection_begin;
        for (ordinal, raw) in value_set.values.iter().enumerate() {
            if !self
                .filter
                .matches(&scope.meas_info_id, &value_set.obj_ldn, raw.p)
            {
                continue;
            }
            let Some(counter) = resolve_counter(scope, raw, ordinal) else {
                continue;
            };
            self.pending.push_back(MeasurementRecord {
                source: self.source.clone(),
                meas_info_id: scope.meas_info_id.clone(),
                obj_ldn: value_set.obj_ldn.clone(),
                counter: counter.to_string(),
                value: if value_set.suspect { None } else { raw.value },
                p_value: raw.p,
                suspect: value_set.suspect,
                collection_start,
                period_end: scope.period_end,
            });
        }
    }
}

/// Resolve a raw value's counter name against its block schema.
///
/// The streamer has already rejected unresolvable indices, so this only
/// returns `None` for the degenerate mixed-style documents it admits.
fn resolve_counter<'a>(
    scope: &'a MeasInfoScope,
    raw: &RawValue,
    ordinal: usize,
) -> Option<&'a str> {
    match raw.p {
        Some(p) => scope.counter_by_p(p).or_else(|| {
            if scope.counters.iter().all(|c| c.p.is_none()) {
                scope.counter_by_ordinal(p.saturating_sub(1) as usize)
            } else {
                None
            }
        }),
        None => scope.counter_by_ordinal(ordinal),
    }
}

impl Iterator for RecordStream {
    type Item = Result<MeasurementRecord, FileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            match self.streamer.next_value_set() {
                Ok(Some(value_set)) => self.flatten(value_set),
                Ok(None) => return None,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}
