//! Spreadsheet sink.

use std::path::{Path, PathBuf};

use log::info;
use rust_xlsxwriter::{Format, Workbook};

use super::{format_time, RecordSink, SinkError, SinkStats};
use crate::record::MeasurementRecord;

/// Buffers records into a workbook saved on finalize.
///
/// The xlsx container cannot be appended to incrementally, so this sink
/// holds the worksheet in memory until `finalize`.
pub struct ExcelSink {
    workbook: Option<Workbook>,
    path: PathBuf,
    next_row: u32,
    records_written: u64,
}

impl ExcelSink {
    /// Create a workbook with a bold header row on the `PM Data` sheet.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("PM Data")?;

        let bold = Format::new().set_bold();
        for (col, header) in MeasurementRecord::COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }

        Ok(Self {
            workbook: Some(workbook),
            path: path.to_path_buf(),
            next_row: 1,
            records_written: 0,
        })
    }
}

impl RecordSink for ExcelSink {
    fn write_batch(&mut self, records: &[MeasurementRecord]) -> Result<(), SinkError> {
        let workbook = self.workbook.as_mut().ok_or(SinkError::Finalized)?;
        let worksheet = workbook
            .worksheet_from_index(0)
            .map_err(SinkError::Xlsx)?;

        for record in records {
            let r = self.next_row;
            worksheet.write_string(r, 0, format_time(record.period_end))?;
            worksheet.write_string(r, 1, format_time(record.collection_start))?;
            worksheet.write_string(r, 2, &record.meas_info_id)?;
            worksheet.write_string(r, 3, &record.obj_ldn)?;
            match record.p_value {
                Some(p) => {
                    worksheet.write_number(r, 4, p as f64)?;
                }
                None => {
                    worksheet.write_string(r, 4, "")?;
                }
            }
            worksheet.write_string(r, 5, &record.counter)?;
            match record.value {
                Some(v) => {
                    worksheet.write_number(r, 6, v)?;
                }
                None => {
                    worksheet.write_string(r, 6, "")?;
                }
            }
            worksheet.write_boolean(r, 7, record.suspect)?;
            worksheet.write_string(r, 8, &record.source)?;
            self.next_row += 1;
        }
        self.records_written += records.len() as u64;
        Ok(())
    }

    fn finalize(&mut self) -> Result<SinkStats, SinkError> {
        let mut workbook = self.workbook.take().ok_or(SinkError::Finalized)?;
        workbook.save(&self.path)?;
        info!(
            "{} records written to {}",
            self.records_written,
            self.path.display()
        );
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
    fn test_workbook_saved_on_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let mut sink = ExcelSink::create(&path).unwrap();
        sink.write_batch(&[sample_record(), sample_record()]).unwrap();
        let stats = sink.finalize().unwrap();
        assert_eq!(stats.records_written, 2);
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_write_after_finalize_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let mut sink = ExcelSink::create(&path).unwrap();
        sink.finalize().unwrap();
        assert!(matches!(
            sink.write_batch(&[sample_record()]),
            Err(SinkError::Finalized)
        ));
    }
}
