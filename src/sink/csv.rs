//! Delimited-text sink.

use std::fs::File;
use std::path::Path;

use log::info;

use super::{format_time, RecordSink, SinkError, SinkStats};
use crate::record::MeasurementRecord;

/// Streams records into a CSV file with a header row.
pub struct CsvSink {
    writer: Option<csv::Writer<File>>,
    path: String,
    records_written: u64,
}

impl CsvSink {
    /// Create the destination file and write the header row.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(MeasurementRecord::COLUMNS)?;
        Ok(Self {
            writer: Some(writer),
            path: path.display().to_string(),
            records_written: 0,
        })
    }
}

impl RecordSink for CsvSink {
    fn write_batch(&mut self, records: &[MeasurementRecord]) -> Result<(), SinkError> {
        let writer = self.writer.as_mut().ok_or(SinkError::Finalized)?;
        for record in records {
            writer.write_record([
                format_time(record.period_end),
                format_time(record.collection_start),
                record.meas_info_id.clone(),
                record.obj_ldn.clone(),
                record.p_value.map(|p| p.to_string()).unwrap_or_default(),
                record.counter.clone(),
                record.value.map(|v| v.to_string()).unwrap_or_default(),
                record.suspect.to_string(),
                record.source.clone(),
            ])?;
        }
        self.records_written += records.len() as u64;
        Ok(())
    }

    fn finalize(&mut self) -> Result<SinkStats, SinkError> {
        let mut writer = self.writer.take().ok_or(SinkError::Finalized)?;
        writer.flush()?;
        info!("{} records written to {}", self.records_written, self.path);
        Ok(SinkStats {
            records_written: self.records_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> MeasurementRecord {
        MeasurementRecord {
            source: "A1.xml".to_string(),
            meas_info_id: "UtranCell".to_string(),
            obj_ldn: "cell1".to_string(),
            counter: "pmRrcConnEstabSucc".to_string(),
            value: Some(10.0),
            p_value: Some(1),
            suspect: false,
            collection_start: None,
            period_end: None,
        }
    }

    #[test]
    fn test_write_and_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::create(&path).unwrap();
        sink.write_batch(&[sample_record()]).unwrap();
        sink.write_batch(&[]).unwrap();
        let stats = sink.finalize().unwrap();
        assert_eq!(stats.records_written, 1);

        let body = std::fs::read_to_string(&path).unwrap();
        let mut lines = body.lines();
        assert!(lines.next().unwrap().starts_with("endTime,beginTime"));
        let row = lines.next().unwrap();
        assert!(row.contains("UtranCell"));
        assert!(row.contains("pmRrcConnEstabSucc"));
        assert!(row.contains("10"));
    }

    #[test]
    fn test_write_after_finalize_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::create(&path).unwrap();
        sink.finalize().unwrap();
        assert!(matches!(
            sink.write_batch(&[sample_record()]),
            Err(SinkError::Finalized)
        ));
        assert!(matches!(sink.finalize(), Err(SinkError::Finalized)));
    }
}
