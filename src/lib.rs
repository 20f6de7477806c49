//! # pmxtract - 3GPP PM Measurement Extraction
//!
//! `pmxtract` converts 3GPP Performance Measurement XML files (the
//! `measCollec` schema of network-counter reports) into filtered, flattened
//! records routed to a spreadsheet, SQLite database, or CSV file.
//!
//! ## Key Features
//!
//! - **Streaming parse**: Files are walked with a pull parser; object
//!   instances are flattened and discarded as their closing tags arrive, so
//!   memory stays flat regardless of file size.
//!
//! - **Predicate filtering**: Optional `measInfoId`, `p`, and `measObjLdn`
//!   filters combine with logical AND and are applied before any output
//!   record is allocated.
//!
//! - **Parallel batches**: A bounded worker pool processes files
//!   independently; one malformed document costs only its own records, and
//!   all sink writes funnel through a single serialized writer.
//!
//! - **Structured outcomes**: Every run yields a per-file status map and
//!   aggregate counts instead of an opaque pass/fail.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pmxtract::dispatch::{Dispatcher, DispatchOptions};
//! use pmxtract::filter::RecordFilter;
//! use pmxtract::sink::CsvSink;
//! use std::path::PathBuf;
//!
//! let files = vec![PathBuf::from("A20230301.1400+0200.xml")];
//! let filter = RecordFilter {
//!     meas_info_id: Some("UtranCell".to_string()),
//!     ..Default::default()
//! };
//!
//! let mut sink = CsvSink::create(std::path::Path::new("pm_data.csv"))?;
//! let dispatcher = Dispatcher::new(DispatchOptions::default());
//! let summary = dispatcher.run(&files, &filter, &mut sink)?;
//!
//! println!(
//!     "{}/{} files, {} records",
//!     summary.succeeded, summary.files_attempted, summary.records_written
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Single-File Use
//!
//! ```rust,no_run
//! use pmxtract::extract::extract_file;
//! use pmxtract::filter::RecordFilter;
//! use std::path::Path;
//!
//! let records = extract_file(Path::new("A20230301.xml"), &RecordFilter::admit_all())?;
//! for record in &records {
//!     println!("{} {} = {:?}", record.obj_ldn, record.counter, record.value);
//! }
//! # Ok::<(), pmxtract::extract::FileError>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`pmxml`]: streaming parser for the PM measurement collection schema
//! - [`record`]: the flattened measurement record handed to sinks
//! - [`filter`]: pure predicate evaluation over raw tuples
//! - [`extract`]: per-file extraction, materialized or lazy
//! - [`dispatch`]: worker pool, serialized sink writer, run summaries
//! - [`sink`]: output contract plus the Excel/SQLite/CSV sinks
//! - [`config`]: configuration surface and validation

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod dispatch;
pub mod extract;
pub mod filter;
pub mod pmxml;
pub mod record;
pub mod sink;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{
        ConfigError, FileConfig, InputSelection, PipelineConfig, DEFAULT_FILE_PATTERN,
    };
    pub use crate::dispatch::{
        CancelToken, DispatchError, DispatchOptions, Dispatcher, FileStatus, RunOutcome,
        RunSummary,
    };
    pub use crate::extract::{extract_file, FileError, RecordStream};
    pub use crate::filter::RecordFilter;
    pub use crate::pmxml::{FileMetadata, PmStreamer, PmXmlError, ValueSet};
    pub use crate::record::MeasurementRecord;
    pub use crate::sink::{
        CsvSink, ExcelSink, OutputKind, RecordSink, SinkError, SinkStats, SqliteSink,
    };
}
