//! Parallel file dispatch: a bounded worker pool feeding one serialized
//! sink writer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   job channel    ┌───────────────────┐
//! │  Dispatcher  │ ────(path)─────▶ │ pmxtract-worker-N │
//! │ (run caller) │                  │ parse + filter    │
//! │  sink writer │ ◀──FileResult──  │                   │
//! └──────────────┘  bounded queue   └───────────────────┘
//! ```
//!
//! Workers never touch the sink; every batch funnels through the calling
//! thread, which drains a bounded result queue. A full queue blocks workers
//! from completing further files, bounding in-flight memory.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::ConfigError;
use crate::extract::{extract_file, FileError};
use crate::filter::RecordFilter;
use crate::record::MeasurementRecord;
use crate::sink::{RecordSink, SinkError};

// State 0 is running; the default
const STATE_DRAINING: u8 = 1;
const STATE_ABORTED: u8 = 2;

/// Cooperative cancellation shared between the dispatcher and its workers.
///
/// `drain` stops new files from being claimed while in-flight files finish;
/// `abort` additionally discards in-flight output. Escalation is one-way.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    state: Arc<AtomicU8>,
}

impl CancelToken {
    /// New token in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop claiming new files; in-flight files complete and are written.
    pub fn drain(&self) {
        self.state.fetch_max(STATE_DRAINING, Ordering::SeqCst);
    }

    /// Abandon immediately; in-flight buffers are discarded, not written.
    pub fn abort(&self) {
        self.state.fetch_max(STATE_ABORTED, Ordering::SeqCst);
    }

    fn load(&self) -> u8 {
        self.state.load(Ordering::SeqCst)
    }

    /// True once `drain` or `abort` has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.load() >= STATE_DRAINING
    }

    /// True once `abort` has been requested.
    pub fn is_aborted(&self) -> bool {
        self.load() >= STATE_ABORTED
    }
}

/// Tuning for one dispatch run.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Worker-pool size; `None` = platform parallelism.
    pub workers: Option<usize>,
    /// Overall deadline for the whole run.
    pub timeout: Option<Duration>,
    /// Abandon the run once this many files have failed.
    pub fail_fast_after: Option<usize>,
    /// Completed-but-unwritten batches that may queue before workers block.
    pub batch_queue_depth: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            workers: None,
            timeout: None,
            fail_fast_after: None,
            batch_queue_depth: 4,
        }
    }
}

impl DispatchOptions {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.batch_queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth);
        }
        Ok(())
    }

    fn worker_count(&self, files: usize) -> usize {
        let available = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        self.workers.unwrap_or(available).min(files).max(1)
    }
}

/// Terminal state of one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum FileStatus {
    /// Parsed and written; `records` may be zero when nothing survived the
    /// filter.
    Success {
        /// Records this file contributed.
        records: usize,
    },
    /// Parse or read failure; contributed zero records.
    Failed {
        /// Why the file was rejected.
        error: FileError,
    },
    /// Not completed before the run deadline.
    TimedOut,
    /// Never claimed because the run was cancelled.
    Skipped,
    /// Completed or in-flight output discarded by a hard abort.
    Aborted,
}

/// Overall disposition of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunOutcome {
    /// Every file succeeded.
    Complete,
    /// A mix: some files succeeded, others failed, timed out, or were
    /// cancelled.
    Partial,
    /// No file succeeded and at least one genuinely failed; zero records
    /// written.
    Failed,
}

/// Structured result of a dispatch run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Files in the batch.
    pub files_attempted: usize,
    /// Files parsed and written (possibly with zero records).
    pub succeeded: usize,
    /// Files that failed to parse or read.
    pub failed: usize,
    /// Files not completed before the deadline.
    pub timed_out: usize,
    /// Files skipped or discarded by cancellation.
    pub cancelled: usize,
    /// Records committed to the sink.
    pub records_written: u64,
    /// Overall disposition.
    pub outcome: RunOutcome,
    /// Per-file status keyed by path.
    pub statuses: BTreeMap<String, FileStatus>,
}

impl RunSummary {
    fn from_statuses(statuses: BTreeMap<String, FileStatus>, records_written: u64) -> Self {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut timed_out = 0;
        let mut cancelled = 0;
        for status in statuses.values() {
            match status {
                FileStatus::Success { .. } => succeeded += 1,
                FileStatus::Failed { .. } => failed += 1,
                FileStatus::TimedOut => timed_out += 1,
                FileStatus::Skipped | FileStatus::Aborted => cancelled += 1,
            }
        }
        let files_attempted = statuses.len();
        let outcome = if succeeded == files_attempted {
            RunOutcome::Complete
        } else if succeeded == 0 && failed > 0 {
            RunOutcome::Failed
        } else {
            RunOutcome::Partial
        };
        Self {
            files_attempted,
            succeeded,
            failed,
            timed_out,
            cancelled,
            records_written,
            outcome,
            statuses,
        }
    }
}

/// Errors that abort a whole run. Per-file failures never appear here;
/// they live in the summary's status map.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Invalid tuning detected before any file was opened.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Destination failure. `records_not_written` counts records workers
    /// had extracted that were never committed.
    #[error("sink failure, {records_not_written} records not written: {source}")]
    Sink {
        /// Extracted records lost to the failure.
        records_not_written: u64,
        /// The underlying sink error.
        source: SinkError,
    },
}

enum WorkOutcome {
    Extracted(Vec<MeasurementRecord>),
    Failed(FileError),
    Skipped,
    Discarded,
}

struct FileResult {
    path: String,
    outcome: WorkOutcome,
}

/// Schedules single-file extraction across a worker pool and serializes
/// all sink writes through the calling thread.
pub struct Dispatcher {
    options: DispatchOptions,
    token: CancelToken,
}

impl Dispatcher {
    /// Create a dispatcher with the given tuning.
    pub fn new(options: DispatchOptions) -> Self {
        Self {
            options,
            token: CancelToken::new(),
        }
    }

    /// Token for cancelling this dispatcher's runs from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Process a batch of files and deliver every surviving record to the
    /// sink. Returns the per-file status map and aggregate counts; only
    /// configuration and sink failures are propagated as errors.
    pub fn run(
        &self,
        files: &[PathBuf],
        filter: &RecordFilter,
        sink: &mut dyn RecordSink,
    ) -> Result<RunSummary, DispatchError> {
        self.options.validate()?;

        let deadline = self.options.timeout.map(|t| Instant::now() + t);
        let worker_count = self.options.worker_count(files.len());
        info!(
            "Dispatching {} files across {} workers",
            files.len(),
            worker_count
        );

        let (job_tx, job_rx) = bounded::<PathBuf>(files.len().max(1));
        for path in files.iter().cloned() {
            // Cannot fail: capacity equals the job count
            let _ = job_tx.send(path);
        }
        drop(job_tx);

        let (result_tx, result_rx) = bounded::<FileResult>(self.options.batch_queue_depth);

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let filter = filter.clone();
            let token = self.token.clone();
            let builder = thread::Builder::new().name(format!("pmxtract-worker-{worker_id}"));
            let handle = builder
                .spawn(move || {
                    while let Ok(path) = job_rx.recv() {
                        let path_str = path.display().to_string();
                        let outcome = if token.is_cancelled() {
                            WorkOutcome::Skipped
                        } else {
                            match extract_file(&path, &filter) {
                                Ok(_) if token.is_aborted() => WorkOutcome::Discarded,
                                Ok(records) => WorkOutcome::Extracted(records),
                                Err(e) => WorkOutcome::Failed(e),
                            }
                        };
                        // A failed send means the writer gave up; exit
                        if result_tx
                            .send(FileResult {
                                path: path_str,
                                outcome,
                            })
                            .is_err()
                        {
                            break;
                        }
                    }
                })
                .map_err(|e| DispatchError::Sink {
                    records_not_written: 0,
                    source: SinkError::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("failed to spawn worker thread: {e}"),
                    )),
                })?;
            handles.push(handle);
        }
        drop(job_rx);
        drop(result_tx);

        let (statuses, records_written, sink_failure, deadline_hit) =
            self.drain_results(files, result_rx, deadline, sink);

        if let Some((records_not_written, source)) = sink_failure {
            return Err(DispatchError::Sink {
                records_not_written,
                source,
            });
        }

        if !deadline_hit {
            for handle in handles {
                if handle.join().is_err() {
                    warn!("a worker thread panicked; its files are marked failed");
                }
            }
        }

        match sink.finalize() {
            Ok(stats) => {
                debug!("sink finalized: {} records", stats.records_written);
            }
            Err(source) => {
                return Err(DispatchError::Sink {
                    records_not_written: records_written,
                    source,
                });
            }
        }

        let summary = RunSummary::from_statuses(statuses, records_written);
        info!(
            "Run {:?}: {}/{} files succeeded, {} records written",
            summary.outcome, summary.succeeded, summary.files_attempted, summary.records_written
        );
        Ok(summary)
    }

    /// Single-writer loop: receives per-file results and serializes all
    /// sink writes. Returns collected statuses, the written-record count,
    /// any sink failure, and whether the deadline fired.
    fn drain_results(
        &self,
        files: &[PathBuf],
        result_rx: crossbeam_channel::Receiver<FileResult>,
        deadline: Option<Instant>,
        sink: &mut dyn RecordSink,
    ) -> (
        BTreeMap<String, FileStatus>,
        u64,
        Option<(u64, SinkError)>,
        bool,
    ) {
        let mut statuses: BTreeMap<String, FileStatus> = BTreeMap::new();
        let mut records_written = 0u64;
        let mut failures = 0usize;
        let mut pending = files.len();
        let mut deadline_hit = false;

        while pending > 0 {
            let received = match deadline {
                Some(d) => result_rx.recv_deadline(d),
                None => result_rx
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };
            let result = match received {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => {
                    warn!("run deadline reached with {pending} files outstanding");
                    self.token.abort();
                    deadline_hit = true;
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };
            pending -= 1;

            match result.outcome {
                WorkOutcome::Extracted(records) if self.token.is_aborted() => {
                    // Raced past the abort on the worker side; discard here
                    drop(records);
                    statuses.insert(result.path, FileStatus::Aborted);
                }
                WorkOutcome::Extracted(records) => {
                    let count = records.len();
                    if let Err(source) = sink.write_batch(&records) {
                        self.token.abort();
                        return (statuses, records_written, Some((count as u64, source)), false);
                    }
                    records_written += count as u64;
                    debug!("{}: {} records written", result.path, count);
                    statuses.insert(result.path, FileStatus::Success { records: count });
                }
                WorkOutcome::Failed(error) => {
                    warn!("{}: {}", result.path, error);
                    statuses.insert(result.path, FileStatus::Failed { error });
                    failures += 1;
                    if let Some(limit) = self.options.fail_fast_after {
                        if failures >= limit && !self.token.is_aborted() {
                            warn!("failure threshold ({limit}) reached, abandoning run");
                            self.token.abort();
                        }
                    }
                }
                WorkOutcome::Skipped => {
                    statuses.insert(result.path, FileStatus::Skipped);
                }
                WorkOutcome::Discarded => {
                    statuses.insert(result.path, FileStatus::Aborted);
                }
            }
        }

        // Anything still unaccounted was cut off by the deadline, or lost
        // its worker to a panic
        for path in files {
            let key = path.display().to_string();
            statuses.entry(key).or_insert_with(|| {
                if deadline_hit {
                    FileStatus::TimedOut
                } else {
                    FileStatus::Failed {
                        error: FileError::Io("worker terminated unexpectedly".to_string()),
                    }
                }
            });
        }

        (statuses, records_written, None, deadline_hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_escalates_one_way() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        token.drain();
        assert!(token.is_cancelled());
        assert!(!token.is_aborted());

        token.abort();
        assert!(token.is_aborted());

        // drain after abort must not downgrade
        token.drain();
        assert!(token.is_aborted());
    }

    #[test]
    fn test_options_validation() {
        let options = DispatchOptions {
            workers: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::ZeroWorkers)
        ));

        let options = DispatchOptions {
            batch_queue_depth: 0,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::ZeroQueueDepth)
        ));

        assert!(DispatchOptions::default().validate().is_ok());
    }

    #[test]
    fn test_worker_count_bounded_by_files() {
        let options = DispatchOptions {
            workers: Some(8),
            ..Default::default()
        };
        assert_eq!(options.worker_count(3), 3);
        assert_eq!(options.worker_count(100), 8);
        assert_eq!(options.worker_count(0), 1);
    }

    #[test]
    fn test_summary_outcomes() {
        let mut statuses = BTreeMap::new();
        statuses.insert("a".to_string(), FileStatus::Success { records: 2 });
        statuses.insert(
            "b".to_string(),
            FileStatus::Failed {
                error: FileError::Malformed("x".to_string()),
            },
        );
        let summary = RunSummary::from_statuses(statuses, 2);
        assert_eq!(summary.outcome, RunOutcome::Partial);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);

        let mut statuses = BTreeMap::new();
        statuses.insert(
            "a".to_string(),
            FileStatus::Failed {
                error: FileError::Io("gone".to_string()),
            },
        );
        let summary = RunSummary::from_statuses(statuses, 0);
        assert_eq!(summary.outcome, RunOutcome::Failed);
        assert_eq!(summary.records_written, 0);

        let mut statuses = BTreeMap::new();
        statuses.insert("a".to_string(), FileStatus::Success { records: 0 });
        let summary = RunSummary::from_statuses(statuses, 0);
        assert_eq!(summary.outcome, RunOutcome::Complete);
    }
}
