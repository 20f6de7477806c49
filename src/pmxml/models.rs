//! Data models for parsed 3GPP PM XML structures
//!
//! These models hold the state the streamer builds while walking one
//! document: file-level header metadata, the scope of the current
//! measurement-info block, and the per-instance value sets it yields.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// File-level metadata from the PM document header and footer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileMetadata {
    /// Source path as given to the streamer.
    pub source: String,

    /// `fileFormatVersion` from the file header.
    pub file_format_version: Option<String>,

    /// `vendorName` from the file header.
    pub vendor_name: Option<String>,

    /// `dnPrefix` from the file header.
    pub dn_prefix: Option<String>,

    /// Local DN of the sending element (`fileSender/@localDn`).
    pub sender_local_dn: Option<String>,

    /// Collection period start (`measCollec/@beginTime`).
    pub collection_begin: Option<DateTime<FixedOffset>>,

    /// Collection period end (`fileFooter/measCollec/@endTime`).
    /// Only populated once the footer has been reached.
    pub collection_end: Option<DateTime<FixedOffset>>,

    /// Local DN of the measured element (`managedElement/@localDn`).
    pub managed_element: Option<String>,
}

/// Declared schema and context of one `measInfo` block.
///
/// Shared by every value set the block contains, so the streamer hands it
/// out behind an [`Arc`] instead of copying counter lists per instance.
#[derive(Debug, Default)]
pub struct MeasInfoScope {
    /// Required `measInfoId` attribute.
    pub meas_info_id: String,

    /// Optional `jobId` child.
    pub job_id: Option<String>,

    /// Granularity period duration (ISO 8601 string, e.g. `PT900S`).
    pub granularity: Option<String>,

    /// Granularity period end (`granPeriod/@endTime`).
    pub period_end: Option<DateTime<FixedOffset>>,

    /// Declared counters in declaration order. Each entry is the counter
    /// name plus its `p` index when one was declared.
    pub counters: Vec<DeclaredCounter>,
}

/// One declared counter from `measType` / `measTypes`.
#[derive(Debug, Clone)]
pub struct DeclaredCounter {
    /// Counter name text.
    pub name: String,
    /// `p` attribute when the `measType p=` style was used.
    pub p: Option<u32>,
}

impl MeasInfoScope {
    /// Resolve a counter name by its declared `p` index.
    pub fn counter_by_p(&self, p: u32) -> Option<&str> {
        self.counters
            .iter()
            .find(|c| c.p == Some(p))
            .map(|c| c.name.as_str())
    }

    /// Resolve a counter name by declaration order (0-based).
    pub fn counter_by_ordinal(&self, ordinal: usize) -> Option<&str> {
        self.counters.get(ordinal).map(|c| c.name.as_str())
    }
}

/// One raw counter value inside a `measValue`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawValue {
    /// The `r` element's `p` attribute; positional values carry none.
    pub p: Option<u32>,
    /// Parsed numeric value; `None` for absent, `NIL`, or non-numeric text.
    pub value: Option<f64>,
}

/// All values reported by one object instance (`measValue` element).
///
/// Yielded by the streamer as the instance's closing tag is reached; the
/// streamer retains no per-instance state afterwards.
#[derive(Debug)]
pub struct ValueSet {
    /// Scope of the enclosing measurement-info block.
    pub scope: Arc<MeasInfoScope>,

    /// Distinguished name of the measured object (`@measObjLdn`).
    pub obj_ldn: String,

    /// Set when the document carried `<suspect>true</suspect>`.
    pub suspect: bool,

    /// Raw values in document order.
    pub values: Vec<RawValue>,
}

/// Parse a PM timestamp attribute.
///
/// The schema uses ISO 8601 / RFC 3339 (`2023-03-01T14:00:00+02:00`); some
/// producers emit the compact `20230301140000+0200` form instead. Anything
/// else yields `None` rather than a fabricated time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, "%Y%m%d%H%M%S%z"))
        .ok()
}
