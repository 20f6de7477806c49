//! Relational sink backed by SQLite.

use std::path::Path;

use log::info;
use rusqlite::{params, Connection};

use super::{format_time, RecordSink, SinkError, SinkStats};
use crate::record::MeasurementRecord;

/// Writes records into a `measData` table, one transaction per batch.
pub struct SqliteSink {
    conn: Option<Connection>,
    destination: String,
    records_written: u64,
}

impl SqliteSink {
    /// Open or create the database file and ensure the schema exists.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, path.display().to_string())
    }

    /// In-memory database (for testing).
    pub fn create_in_memory() -> Result<Self, SinkError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, ":memory:".to_string())
    }

    fn with_connection(conn: Connection, destination: String) -> Result<Self, SinkError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS measData (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                endTime TEXT,
                beginTime TEXT,
                measInfoId TEXT NOT NULL,
                measObjLdn TEXT NOT NULL,
                p INTEGER,
                measType TEXT NOT NULL,
                value REAL,
                suspect INTEGER NOT NULL DEFAULT 0,
                sourceFile TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_measData_time ON measData(endTime);
            CREATE INDEX IF NOT EXISTS idx_measData_info ON measData(measInfoId);",
        )?;
        Ok(Self {
            conn: Some(conn),
            destination,
            records_written: 0,
        })
    }

    /// Direct access to the connection (for verification in tests).
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }
}

impl RecordSink for SqliteSink {
    fn write_batch(&mut self, records: &[MeasurementRecord]) -> Result<(), SinkError> {
        let conn = self.conn.as_mut().ok_or(SinkError::Finalized)?;
        if records.is_empty() {
            return Ok(());
        }

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO measData
                 (endTime, beginTime, measInfoId, measObjLdn, p, measType, value, suspect, sourceFile)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for record in records {
                stmt.execute(params![
                    format_time(record.period_end),
                    format_time(record.collection_start),
                    record.meas_info_id,
                    record.obj_ldn,
                    record.p_value,
                    record.counter,
                    record.value,
                    record.suspect,
                    record.source,
                ])?;
            }
        }
        tx.commit()?;
        self.records_written += records.len() as u64;
        Ok(())
    }

    fn finalize(&mut self) -> Result<SinkStats, SinkError> {
        let conn = self.conn.take().ok_or(SinkError::Finalized)?;
        // Connection::close reports errors the implicit drop would swallow
        conn.close().map_err(|(_, e)| SinkError::Sqlite(e))?;
        info!(
            "{} records written to {}",
            self.records_written, self.destination
        );
        Ok(SinkStats {
            records_written: self.records_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(value: Option<f64>) -> MeasurementRecord {
        MeasurementRecord {
            source: "A1.xml".to_string(),
            meas_info_id: "UtranCell".to_string(),
            obj_ldn: "cell1".to_string(),
            counter: "pmRrcConnEstabSucc".to_string(),
            value,
            p_value: Some(1),
            suspect: false,
            collection_start: None,
            period_end: None,
        }
    }

    #[test]
    fn test_batch_insert_and_query() {
        let mut sink = SqliteSink::create_in_memory().unwrap();
        sink.write_batch(&[sample_record(Some(10.0)), sample_record(None)])
            .unwrap();

        let conn = sink.connection().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM measData", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let nulls: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM measData WHERE value IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn test_finalize_reports_total() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.db");

        let mut sink = SqliteSink::create(&path).unwrap();
        sink.write_batch(&[sample_record(Some(1.0))]).unwrap();
        sink.write_batch(&[sample_record(Some(2.0))]).unwrap();
        let stats = sink.finalize().unwrap();
        assert_eq!(stats.records_written, 2);

        // Reopen to confirm the rows were committed
        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM measData", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_write_after_finalize_rejected() {
        let mut sink = SqliteSink::create_in_memory().unwrap();
        sink.finalize().unwrap();
        assert!(matches!(
            sink.write_batch(&[sample_record(None)]),
            Err(SinkError::Finalized)
        ));
    }
}
