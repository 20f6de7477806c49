//! Flattened measurement records handed from the extraction pipeline to sinks.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// One filtered counter value, the pipeline's unit of output.
///
/// Invariants:
/// - Exactly one record exists per (file, measInfoId, objLdn, counter) tuple
///   that survives filtering.
/// - Records are immutable once built; sinks receive them by shared slice and
///   own nothing beyond the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    /// Identifier of the source document (its path as given).
    pub source: String,
    /// `measInfoId` of the enclosing measurement-info block.
    pub meas_info_id: String,
    /// Distinguished name of the measured object instance.
    pub obj_ldn: String,
    /// Counter name resolved from the block's declared schema.
    pub counter: String,
    /// Counter value. `None` when the raw value was absent or non-numeric,
    /// or when the instance was flagged suspect.
    pub value: Option<f64>,
    /// The value element's `p` attribute. Positionally delivered values
    /// carry none.
    pub p_value: Option<u32>,
    /// Set when the source document marked the instance's data unreliable.
    pub suspect: bool,
    /// Collection period start from the file header, when present.
    pub collection_start: Option<DateTime<FixedOffset>>,
    /// Granularity period end of the enclosing block, when present.
    pub period_end: Option<DateTime<FixedOffset>>,
}

impl MeasurementRecord {
    /// Number of columns a tabular sink needs for one record.
    pub const COLUMN_COUNT: usize = 9;

    /// Header labels shared by the tabular sinks, in column order.
    pub const COLUMNS: [&'static str; Self::COLUMN_COUNT] = [
        "endTime",
        "beginTime",
        "measInfoId",
        "measObjLdn",
        "p",
        "measType",
        "value",
        "suspect",
        "sourceFile",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_labels_match_count() {
        assert_eq!(MeasurementRecord::COLUMNS.len(), MeasurementRecord::COLUMN_COUNT);
    }

    #[test]
    fn test_record_clone_equality() {
        let record = MeasurementRecord {
            source: "A20230101.xml".to_string(),
            meas_info_id: "UtranCell".to_string(),
            obj_ldn: "cell1".to_string(),
            counter: "pmRrcConnEstabSucc".to_string(),
            value: Some(10.0),
            p_value: Some(1),
            suspect: false,
            collection_start: None,
            period_end: None,
        };
        assert_eq!(record.clone(), record);
    }
}
