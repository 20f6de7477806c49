//! # PM XML Parser Module
//!
//! This module provides streaming parsing of 3GPP Performance Measurement
//! collection files (the `measCollec` XML schema used to report network
//! counters over a collection period).
//!
//! ## Design Goals
//!
//! - **Streaming**: Process arbitrarily large files without loading into memory
//! - **Per-instance yield**: Object instances are emitted as their closing
//!   tags are reached, then discarded
//! - **Schema-aware**: Values are validated against the enclosing block's
//!   declared counter schema while parsing
//!
//! ## PM File Structure
//!
//! ```text
//! measCollecFile
//! ├── fileHeader (fileFormatVersion, vendorName, dnPrefix)
//! │   ├── fileSender
//! │   └── measCollec (beginTime)
//! ├── measData* (one per managed element)
//! │   ├── managedElement
//! │   └── measInfo* (measInfoId)
//! │       ├── job
//! │       ├── granPeriod (duration, endTime)
//! │       ├── measType* (p) | measTypes (whitespace list)
//! │       └── measValue* (measObjLdn)
//! │           ├── r* (p) | measResults (whitespace list)
//! │           └── suspect
//! └── fileFooter
//!     └── measCollec (endTime)
//! ```

mod models;
mod streamer;

pub use models::{
    parse_timestamp, DeclaredCounter, FileMetadata, MeasInfoScope, RawValue, ValueSet,
};
pub use streamer::{PmStreamer, PmXmlError, ValueSetIterator};
