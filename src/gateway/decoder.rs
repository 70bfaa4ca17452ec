use crate::domain::{Epoch, Record, Response, Series, Value};
use crate::gateway::converter;
use quick_xml::Reader;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

// The gateway sends bare fragments; they are parsed inside this synthetic root.
const ROOT: &str = "response";
const SERIES_MARKERS: [&str; 2] = ["Interval data start", "HistoryData"];
const SERIES_NOISE: [&str; 2] = ["Info", "Text"];

/// A parsed XML element. Text is trimmed; whitespace-only text is `None`.
#[derive(Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Element {
            name,
            ..Element::default()
        }
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// All elements below this one, in document order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut result = Vec::new();
        let mut pending: Vec<&Element> = self.children.iter().rev().collect();
        while let Some(element) = pending.pop() {
            result.push(element);
            pending.extend(element.children.iter().rev());
        }
        result
    }
}

/// Whether a raw response holds a list of historical samples rather than one record.
pub fn is_series(raw: &str) -> bool {
    SERIES_MARKERS.iter().any(|marker| raw.contains(marker))
}

/// Decodes a raw gateway response.
///
/// With `convert` unset, field values are kept as the gateway sent them.
#[instrument(skip(raw, epoch), fields(raw_bytes = raw.len()))]
pub fn decode(raw: &str, convert: bool, epoch: &Epoch) -> Result<Response, ParseError> {
    let converter = FieldConverter { convert, epoch };

    if is_series(raw) {
        let series = match parse_fragments(raw) {
            Ok(root) => flatten_series(&root, &converter),
            Err(e) => {
                warn!("⚠️ Discarding malformed series response: {}", e);
                Series::new()
            }
        };
        debug!("Decoded a series of {} sample(s)", series.len());
        return Ok(Response::Series(series));
    }

    let root = parse_fragments(raw)?;
    let record = flatten_record(&root, &converter);
    debug!("Decoded a record with {} section(s)", record.len());
    Ok(Response::Record(record))
}

/// Parses concatenated fragments into a tree under the synthetic root element.
pub fn parse_fragments(raw: &str) -> Result<Element, ParseError> {
    let wrapped = format!("<{ROOT}>{raw}</{ROOT}>");
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(ParseError::TrailingContent);
                }
                stack.push(Element::new(checked_name(&start)?));
            }
            Event::Empty(empty) => {
                let element = Element::new(checked_name(&empty)?);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Err(ParseError::TrailingContent),
                }
            }
            Event::End(_) => {
                let element = stack.pop().ok_or(ParseError::UnexpectedEnd)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(quick_xml::Error::from)?;
                check_chars(&text)?;
                if let Some(current) = stack.last_mut() {
                    current.append_text(text.trim());
                }
            }
            Event::CData(cdata) => {
                let bytes = cdata.into_inner();
                let text = String::from_utf8_lossy(&bytes);
                check_chars(&text)?;
                if let Some(current) = stack.last_mut() {
                    current.append_text(text.trim());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unclosed(open.name));
    }
    root.ok_or(ParseError::UnexpectedEnd)
}

/// Returns the element name once the name and every attribute are well-formed.
fn checked_name(start: &BytesStart) -> Result<String, ParseError> {
    let name = element_name(start);
    let mut chars = name.chars();
    let starts_well = chars.next().is_some_and(|c| c.is_alphabetic() || c == '_' || c == ':');
    if !starts_well || !chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')) {
        return Err(ParseError::InvalidName(name));
    }
    for attribute in start.attributes() {
        let attribute = attribute?;
        check_chars(&String::from_utf8_lossy(&attribute.value))?;
    }
    Ok(name)
}

// XML 1.0 Char production; surrogates cannot occur in a Rust `char`.
fn check_chars(text: &str) -> Result<(), ParseError> {
    match text
        .chars()
        .find(|c| !matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'))
    {
        Some(c) => Err(ParseError::InvalidCharacter(c)),
        None => Ok(()),
    }
}

fn element_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

struct FieldConverter<'a> {
    convert: bool,
    epoch: &'a Epoch,
}

impl FieldConverter<'_> {
    fn apply(&self, element: &Element) -> Option<Value> {
        if self.convert {
            converter::convert(&element.name, element.text.as_deref(), self.epoch)
        } else {
            converter::passthrough(element.text.as_deref())
        }
    }
}

/// Every fragment becomes a section; every element with text at any depth inside it
/// becomes a field of that section.
fn flatten_record(root: &Element, converter: &FieldConverter) -> Record {
    let mut record = Record::new();
    for fragment in &root.children {
        let fields = record.section_mut(&fragment.name);
        for element in std::iter::once(fragment).chain(fragment.descendants()) {
            if let Some(value) = converter.apply(element) {
                trace!(section = %fragment.name, "{} = {:?}", element.name, value);
                fields.insert(element.name.as_str(), value);
            }
        }
    }
    record
}

/// Every element without text starts a new sample; elements with text become fields
/// of the latest sample.
fn flatten_series(root: &Element, converter: &FieldConverter) -> Series {
    let mut series = Series::new();
    for element in root.descendants() {
        if SERIES_NOISE.contains(&element.name.as_str()) {
            continue;
        }
        match converter.apply(element) {
            Some(value) => series.insert(element.name.as_str(), value),
            None => series.start_sample(),
        }
    }
    series
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("unexpected closing tag")]
    UnexpectedEnd,
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("content after the end of the response")]
    TrailingContent,
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("invalid element name <{0}>")]
    InvalidName(String),
    #[error("invalid character {0:?}")]
    InvalidCharacter(char),
}
