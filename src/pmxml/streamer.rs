//! Streaming PM XML parser using quick-xml
//!
//! This module provides a pull-based streaming parser for 3GPP PM
//! measurement collection files, designed to handle arbitrarily large
//! files with minimal memory usage. Object instances are yielded as their
//! closing tags are encountered; no document tree is ever built.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::models::{
    parse_timestamp, DeclaredCounter, FileMetadata, MeasInfoScope, RawValue, ValueSet,
};

/// Errors that can occur during PM XML parsing
#[derive(Debug, thiserror::Error)]
pub enum PmXmlError {
    /// Underlying XML syntax error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// File unreadable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Nesting violation or missing required element.
    #[error("invalid PM document structure: {0}")]
    InvalidStructure(String),

    /// A required attribute was absent.
    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    /// An attribute value failed to parse.
    #[error("invalid attribute value: {0}")]
    InvalidAttributeValue(String),

    /// A value referenced a counter index outside the block's schema.
    #[error("value index {index} not declared by block '{meas_info_id}' ({declared} counters declared)")]
    UndeclaredCounterIndex {
        /// The offending block's `measInfoId`.
        meas_info_id: String,
        /// The unresolvable index (explicit `p` or 1-based position).
        index: u32,
        /// How many counters the block declared.
        declared: usize,
    },

    /// Attribute bytes were not valid UTF-8.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl PmXmlError {
    /// Whether this error came from the I/O layer rather than the document.
    /// Everything else counts as a malformed document.
    pub fn is_io(&self) -> bool {
        match self {
            PmXmlError::Io(_) => true,
            PmXmlError::Xml(quick_xml::Error::Io(_)) => true,
            _ => false,
        }
    }
}

/// Streaming parser for 3GPP PM measurement collection files
pub struct PmStreamer<R: BufRead> {
    reader: Reader<R>,
    metadata: FileMetadata,
    header_read: bool,
    root_seen: bool,
    in_meas_data: bool,
    scope: Option<Arc<MeasInfoScope>>,
    finished: bool,
}

impl PmStreamer<BufReader<File>> {
    /// Open a PM file for streaming
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PmXmlError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(64 * 1024, file);
        let mut streamer = Self::new(reader)?;
        streamer.metadata.source = path.display().to_string();
        Ok(streamer)
    }
}

impl<R: BufRead> PmStreamer<R> {
    /// Create a new streamer from a BufRead source
    pub fn new(reader: R) -> Result<Self, PmXmlError> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        Ok(Self {
            reader: xml_reader,
            metadata: FileMetadata::default(),
            header_read: false,
            root_seen: false,
            in_meas_data: false,
            scope: None,
            finished: false,
        })
    }

    /// Get the file metadata gathered so far.
    ///
    /// `collection_end` is only present once the footer has been consumed,
    /// i.e. after `next_value_set` has returned `None`.
    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    /// Read file-level metadata (everything before the first measData)
    pub fn read_header(&mut self) -> Result<&FileMetadata, PmXmlError> {
        if self.header_read {
            return Ok(&self.metadata);
        }

        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"measCollecFile" => {
                        self.root_seen = true;
                    }
                    b"fileHeader" => {
                        self.require_root("fileHeader")?;
                        self.metadata.file_format_version =
                            get_attribute(e, "fileFormatVersion")?;
                        self.metadata.vendor_name = get_attribute(e, "vendorName")?;
                        self.metadata.dn_prefix = get_attribute(e, "dnPrefix")?;
                    }
                    b"measData" => {
                        self.require_root("measData")?;
                        self.in_meas_data = true;
                        break;
                    }
                    b"fileFooter" => {
                        // Degenerate but legal: a file with no measData
                        self.require_root("fileFooter")?;
                        self.parse_footer()?;
                    }
                    b"fileSender" => {
                        self.metadata.sender_local_dn = get_attribute(e, "localDn")?;
                    }
                    b"measCollec" => {
                        self.metadata.collection_begin = get_attribute(e, "beginTime")?
                            .as_deref()
                            .and_then(parse_timestamp);
                    }
                    other => {
                        if !self.root_seen {
                            return Err(PmXmlError::InvalidStructure(format!(
                                "unexpected root element '{}'",
                                String::from_utf8_lossy(other)
                            )));
                        }
                    }
                },
                Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"fileSender" => {
                        self.metadata.sender_local_dn = get_attribute(e, "localDn")?;
                    }
                    b"measCollec" => {
                        self.metadata.collection_begin = get_attribute(e, "beginTime")?
                            .as_deref()
                            .and_then(parse_timestamp);
                    }
                    _ => {}
                },
                Ok(Event::Eof) => {
                    if !self.root_seen {
                        return Err(PmXmlError::InvalidStructure(
                            "not a PM measurement collection file".to_string(),
                        ));
                    }
                    self.finished = true;
                    break;
                }
                Err(e) => return Err(PmXmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        self.header_read = true;
        Ok(&self.metadata)
    }

    /// Read the next object instance from the stream.
    ///
    /// Returns `None` once the document is exhausted. Instance state is
    /// discarded as each value set is handed out; block scope is shared
    /// behind an `Arc`.
    pub fn next_value_set(&mut self) -> Result<Option<ValueSet>, PmXmlError> {
        if !self.header_read {
            self.read_header()?;
        }
        if self.finished {
            return Ok(None);
        }

        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"measData" => {
                        self.require_root("measData")?;
                        self.in_meas_data = true;
                    }
                    b"measInfo" => {
                        if !self.in_meas_data {
                            return Err(PmXmlError::InvalidStructure(
                                "measInfo outside measData".to_string(),
                            ));
                        }
                        let meas_info_id = get_attribute(e, "measInfoId")?
                            .ok_or_else(|| PmXmlError::MissingAttribute("measInfoId".to_string()))?;
                        self.scope = Some(Arc::new(MeasInfoScope {
                            meas_info_id,
                            ..Default::default()
                        }));
                    }
                    b"measType" => {
                        let p = parse_p_attribute(e)?;
                        let name = self.read_text_content(b"measType")?;
                        self.push_counter(DeclaredCounter { name, p })?;
                    }
                    b"measTypes" => {
                        let list = self.read_text_content(b"measTypes")?;
                        for name in list.split_whitespace() {
                            self.push_counter(DeclaredCounter {
                                name: name.to_string(),
                                p: None,
                            })?;
                        }
                    }
                    b"measValue" => {
                        let scope = self.scope.clone().ok_or_else(|| {
                            PmXmlError::InvalidStructure("measValue outside measInfo".to_string())
                        })?;
                        let obj_ldn = get_attribute(e, "measObjLdn")?
                            .ok_or_else(|| PmXmlError::MissingAttribute("measObjLdn".to_string()))?;
                        let value_set = self.parse_value_set(scope, obj_ldn)?;
                        return Ok(Some(value_set));
                    }
                    b"r" | b"measResults" => {
                        return Err(PmXmlError::InvalidStructure(format!(
                            "{} outside measValue",
                            String::from_utf8_lossy(e.local_name().as_ref())
                        )));
                    }
                    b"fileFooter" => {
                        self.parse_footer()?;
                    }
                    name => {
                        // Attribute-only elements may arrive with explicit
                        // end tags instead of self-closing
                        let owned = name.to_vec();
                        self.handle_attribute_element(&owned, e)?;
                    }
                },
                Ok(Event::Empty(ref e)) => {
                    let owned = e.local_name().as_ref().to_vec();
                    self.handle_attribute_element(&owned, e)?;
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"measInfo" => {
                        self.scope = None;
                    }
                    b"measData" => {
                        self.in_meas_data = false;
                    }
                    b"measCollecFile" => {
                        self.finished = true;
                        return Ok(None);
                    }
                    _ => {}
                },
                Ok(Event::Eof) => {
                    if self.in_meas_data || self.scope.is_some() {
                        return Err(PmXmlError::InvalidStructure(
                            "unexpected EOF inside measData".to_string(),
                        ));
                    }
                    self.finished = true;
                    return Ok(None);
                }
                Err(e) => return Err(PmXmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }
    }

    /// Iterate over all value sets
    pub fn value_sets(self) -> ValueSetIterator<R> {
        ValueSetIterator { streamer: self }
    }

    /// Parse one measValue element (start tag already consumed)
    fn parse_value_set(
        &mut self,
        scope: Arc<MeasInfoScope>,
        obj_ldn: String,
    ) -> Result<ValueSet, PmXmlError> {
        let mut values: Vec<RawValue> = Vec::new();
        let mut suspect = false;
        let mut ordinal = 0usize;
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"r" => {
                        let p = parse_p_attribute(e)?;
                        let text = self.read_text_content(b"r")?;
                        self.check_value_index(&scope, p, ordinal)?;
                        values.push(RawValue {
                            p,
                            value: parse_value_text(&text),
                        });
                        ordinal += 1;
                    }
                    b"measResults" => {
                        let list = self.read_text_content(b"measResults")?;
                        for token in list.split_whitespace() {
                            self.check_value_index(&scope, None, ordinal)?;
                            values.push(RawValue {
                                p: None,
                                value: parse_value_text(token),
                            });
                            ordinal += 1;
                        }
                    }
                    b"suspect" => {
                        let text = self.read_text_content(b"suspect")?;
                        suspect = matches!(text.trim(), "true" | "1");
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    // An empty <r p="N"/> carries no value text
                    if e.local_name().as_ref() == b"r" {
                        let p = parse_p_attribute(e)?;
                        self.check_value_index(&scope, p, ordinal)?;
                        values.push(RawValue { p, value: None });
                        ordinal += 1;
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == b"measValue" {
                        break;
                    }
                }
                Ok(Event::Eof) => {
                    return Err(PmXmlError::InvalidStructure(
                        "unexpected EOF in measValue".to_string(),
                    ));
                }
                Err(e) => return Err(PmXmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(ValueSet {
            scope,
            obj_ldn,
            suspect,
            values,
        })
    }

    /// Verify a value resolves against the block's declared schema
    fn check_value_index(
        &self,
        scope: &MeasInfoScope,
        p: Option<u32>,
        ordinal: usize,
    ) -> Result<(), PmXmlError> {
        let resolvable = match p {
            Some(p) => {
                scope.counter_by_p(p).is_some()
                    || (scope.counters.iter().all(|c| c.p.is_none())
                        && scope.counter_by_ordinal(p.saturating_sub(1) as usize).is_some())
            }
            None => scope.counter_by_ordinal(ordinal).is_some(),
        };
        if resolvable {
            Ok(())
        } else {
            Err(PmXmlError::UndeclaredCounterIndex {
                meas_info_id: scope.meas_info_id.clone(),
                index: p.unwrap_or(ordinal as u32 + 1),
                declared: scope.counters.len(),
            })
        }
    }

    /// Read the text content of an element and consume its end tag
    fn read_text_content(&mut self, end: &[u8]) -> Result<String, PmXmlError> {
        let mut buf = Vec::new();
        let mut text = String::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Text(ref t)) => {
                    text.push_str(&t.unescape()?);
                }
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == end {
                        return Ok(text);
                    }
                }
                Ok(Event::Eof) => {
                    return Err(PmXmlError::InvalidStructure(format!(
                        "unexpected EOF in {}",
                        String::from_utf8_lossy(end)
                    )));
                }
                Err(e) => return Err(PmXmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }
    }

    /// Parse the fileFooter element (start tag already consumed)
    fn parse_footer(&mut self) -> Result<(), PmXmlError> {
        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"measCollec" {
                        self.metadata.collection_end = get_attribute(e, "endTime")?
                            .as_deref()
                            .and_then(parse_timestamp);
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == b"fileFooter" {
                        return Ok(());
                    }
                }
                Ok(Event::Eof) => {
                    return Err(PmXmlError::InvalidStructure(
                        "unexpected EOF in fileFooter".to_string(),
                    ));
                }
                Err(e) => return Err(PmXmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }
    }

    /// Handle elements that carry their payload in attributes and may be
    /// written either self-closing or with an explicit end tag.
    fn handle_attribute_element(
        &mut self,
        name: &[u8],
        e: &BytesStart,
    ) -> Result<(), PmXmlError> {
        match name {
            b"managedElement" => {
                self.metadata.managed_element = get_attribute(e, "localDn")?;
            }
            b"granPeriod" => {
                let duration = get_attribute(e, "duration")?;
                let period_end = get_attribute(e, "endTime")?
                    .as_deref()
                    .and_then(parse_timestamp);
                self.update_scope(|scope| {
                    scope.granularity = duration;
                    scope.period_end = period_end;
                    Ok(())
                })?;
            }
            b"job" => {
                let job_id = get_attribute(e, "jobId")?;
                self.update_scope(|scope| {
                    scope.job_id = job_id;
                    Ok(())
                })?;
            }
            b"measCollec" => {
                self.metadata.collection_end = get_attribute(e, "endTime")?
                    .as_deref()
                    .and_then(parse_timestamp);
            }
            _ => {}
        }
        Ok(())
    }

    fn require_root(&self, element: &str) -> Result<(), PmXmlError> {
        if self.root_seen {
            Ok(())
        } else {
            Err(PmXmlError::InvalidStructure(format!(
                "{element} outside measCollecFile"
            )))
        }
    }

    /// Mutate the current block scope; declarations outside measInfo are
    /// a nesting violation.
    fn update_scope<F>(&mut self, f: F) -> Result<(), PmXmlError>
    where
        F: FnOnce(&mut MeasInfoScope) -> Result<(), PmXmlError>,
    {
        let scope = self.scope.take().ok_or_else(|| {
            PmXmlError::InvalidStructure("block declaration outside measInfo".to_string())
        })?;
        // Scope is only shared once the first measValue is yielded; up to
        // that point the Arc has a single owner.
        let mut inner = Arc::try_unwrap(scope).map_err(|_| {
            PmXmlError::InvalidStructure(
                "counter declaration after first measValue".to_string(),
            )
        })?;
        f(&mut inner)?;
        self.scope = Some(Arc::new(inner));
        Ok(())
    }

    fn push_counter(&mut self, counter: DeclaredCounter) -> Result<(), PmXmlError> {
        self.update_scope(|scope| {
            scope.counters.push(counter);
            Ok(())
        })
    }
}

/// Iterator over object instances in a PM file
pub struct ValueSetIterator<R: BufRead> {
    streamer: PmStreamer<R>,
}

impl<R: BufRead> ValueSetIterator<R> {
    /// Access the underlying streamer's metadata.
    pub fn metadata(&self) -> &FileMetadata {
        self.streamer.metadata()
    }
}

impl<R: BufRead> Iterator for ValueSetIterator<R> {
    type Item = Result<ValueSet, PmXmlError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.streamer.next_value_set() {
            Ok(Some(value_set)) => Some(Ok(value_set)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Helper function to get an attribute value from a BytesStart
fn get_attribute(e: &BytesStart, name: &str) -> Result<Option<String>, PmXmlError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| PmXmlError::Xml(quick_xml::Error::from(e)))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = std::str::from_utf8(&attr.value)?.to_string();
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Parse the optional `p` index attribute
fn parse_p_attribute(e: &BytesStart) -> Result<Option<u32>, PmXmlError> {
    match get_attribute(e, "p")? {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| PmXmlError::InvalidAttributeValue(format!("p=\"{raw}\""))),
        None => Ok(None),
    }
}

/// Parse counter value text; absent or non-numeric text yields `None`
fn parse_value_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nil") {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const MINIMAL_PM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<measCollecFile xmlns="http://www.3gpp.org/ftp/specs/archive/32_series/32.435#measCollec">
  <fileHeader fileFormatVersion="32.435 V10.0" vendorName="Acme" dnPrefix="DC=net">
    <fileSender localDn="SubNetwork=1,ManagedElement=1"/>
    <measCollec beginTime="2023-03-01T14:00:00+02:00"/>
  </fileHeader>
  <measData>
    <managedElement localDn="ManagedElement=1"/>
    <measInfo measInfoId="UtranCell">
      <granPeriod duration="PT900S" endTime="2023-03-01T14:15:00+02:00"/>
      <measType p="1">pmRrcConnEstabSucc</measType>
      <measType p="2">pmRrcConnEstabAtt</measType>
      <measValue measObjLdn="cell1">
        <r p="1">10</r>
        <r p="2">12</r>
      </measValue>
    </measInfo>
  </measData>
  <fileFooter>
    <measCollec endTime="2023-03-01T15:00:00+02:00"/>
  </fileFooter>
</measCollecFile>"#;

    fn streamer_for(xml: &str) -> PmStreamer<BufReader<Cursor<Vec<u8>>>> {
        let reader = BufReader::new(Cursor::new(xml.as_bytes().to_vec()));
        PmStreamer::new(reader).unwrap()
    }

    #[test]
    fn test_parse_minimal_pm_file() {
        let mut streamer = streamer_for(MINIMAL_PM);

        let vs = streamer.next_value_set().unwrap().unwrap();
        assert_eq!(vs.scope.meas_info_id, "UtranCell");
        assert_eq!(vs.obj_ldn, "cell1");
        assert!(!vs.suspect);
        assert_eq!(vs.values.len(), 2);
        assert_eq!(vs.values[0], RawValue { p: Some(1), value: Some(10.0) });
        assert_eq!(vs.values[1], RawValue { p: Some(2), value: Some(12.0) });
        assert_eq!(vs.scope.counter_by_p(1), Some("pmRrcConnEstabSucc"));

        assert!(streamer.next_value_set().unwrap().is_none());

        let meta = streamer.metadata();
        assert_eq!(meta.vendor_name.as_deref(), Some("Acme"));
        assert_eq!(
            meta.collection_begin.unwrap().to_rfc3339(),
            "2023-03-01T14:00:00+02:00"
        );
        assert_eq!(
            meta.collection_end.unwrap().to_rfc3339(),
            "2023-03-01T15:00:00+02:00"
        );
    }

    #[test]
    fn test_meas_types_positional_lists() {
        let xml = r#"<measCollecFile>
  <measData>
    <measInfo measInfoId="EthPort">
      <granPeriod duration="PT900S" endTime="2023-03-01T14:15:00+02:00"/>
      <measTypes>ifInOctets ifOutOctets ifErrors</measTypes>
      <measValue measObjLdn="port1">
        <measResults>100 200 NIL</measResults>
      </measValue>
    </measInfo>
  </measData>
</measCollecFile>"#;
        let mut streamer = streamer_for(xml);

        let vs = streamer.next_value_set().unwrap().unwrap();
        assert_eq!(vs.values.len(), 3);
        assert_eq!(vs.values[0], RawValue { p: None, value: Some(100.0) });
        assert_eq!(vs.values[2], RawValue { p: None, value: None });
        assert_eq!(vs.scope.counter_by_ordinal(2), Some("ifErrors"));
    }

    #[test]
    fn test_suspect_flag() {
        let xml = r#"<measCollecFile>
  <measData>
    <measInfo measInfoId="UtranCell">
      <measType p="1">pmCounter</measType>
      <measValue measObjLdn="cell1">
        <r p="1">7</r>
        <suspect>true</suspect>
      </measValue>
    </measInfo>
  </measData>
</measCollecFile>"#;
        let mut streamer = streamer_for(xml);
        let vs = streamer.next_value_set().unwrap().unwrap();
        assert!(vs.suspect);
    }

    #[test]
    fn test_undeclared_p_index_is_malformed() {
        let xml = r#"<measCollecFile>
  <measData>
    <measInfo measInfoId="UtranCell">
      <measType p="1">pmCounter</measType>
      <measValue measObjLdn="cell1">
        <r p="3">7</r>
      </measValue>
    </measInfo>
  </measData>
</measCollecFile>"#;
        let mut streamer = streamer_for(xml);
        let err = streamer.next_value_set().unwrap_err();
        match err {
            PmXmlError::UndeclaredCounterIndex { index, declared, .. } => {
                assert_eq!(index, 3);
                assert_eq!(declared, 1);
            }
            other => panic!("expected UndeclaredCounterIndex, got {other:?}"),
        }
        assert!(!err.is_io());
    }

    #[test]
    fn test_positional_overflow_is_malformed() {
        // Three values against a two-counter schema
        let xml = r#"<measCollecFile>
  <measData>
    <measInfo measInfoId="UtranCell">
      <measTypes>a b</measTypes>
      <measValue measObjLdn="cell1">
        <measResults>1 2 3</measResults>
      </measValue>
    </measInfo>
  </measData>
</measCollecFile>"#;
        let mut streamer = streamer_for(xml);
        assert!(matches!(
            streamer.next_value_set(),
            Err(PmXmlError::UndeclaredCounterIndex { .. })
        ));
    }

    #[test]
    fn test_meas_value_outside_meas_info() {
        let xml = r#"<measCollecFile>
  <measData>
    <measValue measObjLdn="cell1"><r p="1">7</r></measValue>
  </measData>
</measCollecFile>"#;
        let mut streamer = streamer_for(xml);
        assert!(matches!(
            streamer.next_value_set(),
            Err(PmXmlError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_missing_meas_info_id() {
        let xml = r#"<measCollecFile>
  <measData>
    <measInfo>
      <measType p="1">pmCounter</measType>
    </measInfo>
  </measData>
</measCollecFile>"#;
        let mut streamer = streamer_for(xml);
        assert!(matches!(
            streamer.next_value_set(),
            Err(PmXmlError::MissingAttribute(_))
        ));
    }

    #[test]
    fn test_non_pm_document_rejected() {
        let mut streamer = streamer_for("<html><body/></html>");
        assert!(matches!(
            streamer.next_value_set(),
            Err(PmXmlError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_non_numeric_value_yields_none() {
        let xml = r#"<measCollecFile>
  <measData>
    <measInfo measInfoId="UtranCell">
      <measType p="1">pmCounter</measType>
      <measValue measObjLdn="cell1">
        <r p="1">garbage</r>
      </measValue>
    </measInfo>
  </measData>
</measCollecFile>"#;
        let mut streamer = streamer_for(xml);
        let vs = streamer.next_value_set().unwrap().unwrap();
        assert_eq!(vs.values[0].value, None);
    }

    #[test]
    fn test_namespace_prefixes_tolerated() {
        let xml = r#"<mc:measCollecFile xmlns:mc="http://www.3gpp.org/ftp/specs/archive/32_series/32.435#measCollec">
  <mc:measData>
    <mc:measInfo measInfoId="UtranCell">
      <mc:measType p="1">pmCounter</mc:measType>
      <mc:measValue measObjLdn="cell1">
        <mc:r p="1">5</mc:r>
      </mc:measValue>
    </mc:measInfo>
  </mc:measData>
</mc:measCollecFile>"#;
        let mut streamer = streamer_for(xml);
        let vs = streamer.next_value_set().unwrap().unwrap();
        assert_eq!(vs.values[0], RawValue { p: Some(1), value: Some(5.0) });
    }

    #[test]
    fn test_iterator_adapter() {
        let streamer = streamer_for(MINIMAL_PM);
        let sets: Vec<_> = streamer.value_sets().collect::<Result<_, _>>().unwrap();
        assert_eq!(sets.len(), 1);
    }
}
