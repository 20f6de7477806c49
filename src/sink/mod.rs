//! Output sink contract and the shipped sink implementations.
//!
//! The pipeline only requires the narrow contract below: accept record
//! batches, then finalize exactly once. Writes are serialized by the
//! dispatcher; a sink never sees concurrent calls.

use std::path::Path;

use crate::record::MeasurementRecord;

mod csv;
mod excel;
mod sqlite;

pub use self::csv::CsvSink;
pub use self::excel::ExcelSink;
pub use self::sqlite::SqliteSink;

/// Errors surfaced by sink operations. Any of these is fatal to the run,
/// distinct from per-file parse failures.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Destination unwritable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failure.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Database failure.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Workbook failure.
    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// `write_batch` or `finalize` called after `finalize`.
    #[error("sink already finalized")]
    Finalized,
}

/// Statistics returned by a sink on finalize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Records committed to the destination.
    pub records_written: u64,
}

/// Destination contract consumed by the dispatcher.
///
/// `write_batch` may be called any number of times (including with an empty
/// slice) before `finalize`; afterwards every call fails with
/// [`SinkError::Finalized`]. Implementations flush and release the output
/// resource on finalize, and on drop if finalize was never reached.
pub trait RecordSink: Send {
    /// Append a batch of records.
    fn write_batch(&mut self, records: &[MeasurementRecord]) -> Result<(), SinkError>;

    /// Commit all previously written batches and release the destination.
    fn finalize(&mut self) -> Result<SinkStats, SinkError>;
}

/// Output kinds selectable from the configuration surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Spreadsheet workbook (`.xlsx`)
    Excel,
    /// SQLite database file
    Sqlite,
    /// Delimited text (`.csv`)
    Csv,
}

impl OutputKind {
    /// Conventional file extension for the kind.
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Excel => "xlsx",
            OutputKind::Sqlite => "db",
            OutputKind::Csv => "csv",
        }
    }
}

/// Create a sink of the given kind writing to `path`.
pub fn create(kind: OutputKind, path: &Path) -> Result<Box<dyn RecordSink>, SinkError> {
    Ok(match kind {
        OutputKind::Excel => Box::new(ExcelSink::create(path)?),
        OutputKind::Sqlite => Box::new(SqliteSink::create(path)?),
        OutputKind::Csv => Box::new(CsvSink::create(path)?),
    })
}

/// Render an optional timestamp column.
pub(crate) fn format_time(ts: Option<chrono::DateTime<chrono::FixedOffset>>) -> String {
    ts.map(|t| t.to_rfc3339()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_kind_extensions() {
        assert_eq!(OutputKind::Excel.extension(), "xlsx");
        assert_eq!(OutputKind::Sqlite.extension(), "db");
        assert_eq!(OutputKind::Csv.extension(), "csv");
    }
}
