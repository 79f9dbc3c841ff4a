use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Lines;

use chrono::{DateTime, FixedOffset};
use monoize_types::{ChangeDescriptor, ChangeUnit};
use tracing::debug;

use crate::date::parse_date;
use crate::error::{HeaderError, HeaderField, ParseError};

pub const AUTHOR_PREFIX: &str = "From: ";
pub const DATE_PREFIX: &str = "Date: ";
pub const SUBJECT_PREFIX: &str = "Subject: ";

/// Header fields of an exported change, prefixes stripped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeHeader {
    pub author: String,
    pub timestamp: DateTime<FixedOffset>,
    pub subject: String,
}

/// Parse the header at the start of `text`.
///
/// Folded author and subject lines (continuations starting with a space or
/// tab) are joined onto their field with a single space. Git folds long or
/// RFC 2047-encoded `From:` values this way.
pub fn parse_header(text: &str) -> Result<ChangeHeader, HeaderError> {
    let mut lines = text.lines().peekable();

    lines
        .next()
        .ok_or(HeaderError::MissingLine(HeaderField::Envelope))?;
    let author = folded(&mut lines, HeaderField::Author, AUTHOR_PREFIX)?;
    let date = field(lines.next(), HeaderField::Date, DATE_PREFIX)?;
    let timestamp = parse_date(date)?;
    let subject = folded(&mut lines, HeaderField::Subject, SUBJECT_PREFIX)?;

    Ok(ChangeHeader {
        author,
        timestamp,
        subject,
    })
}

fn folded(
    lines: &mut Peekable<Lines<'_>>,
    kind: HeaderField,
    prefix: &'static str,
) -> Result<String, HeaderError> {
    let mut value = field(lines.next(), kind, prefix)?.to_string();
    while let Some(line) = lines.next_if(|line| line.starts_with([' ', '\t'])) {
        value.push(' ');
        value.push_str(line.trim_start());
    }
    Ok(value)
}

fn field<'a>(
    line: Option<&'a str>,
    kind: HeaderField,
    prefix: &'static str,
) -> Result<&'a str, HeaderError> {
    let line = line.ok_or(HeaderError::MissingLine(kind))?;
    line.strip_prefix(prefix)
        .ok_or_else(|| HeaderError::UnexpectedLine {
            field: kind,
            prefix,
            found: line.to_string(),
        })
}

/// The header block of a raw payload: everything up to the first blank
/// line. Only this part is decoded; the diff may hold any bytes.
fn header_block(payload: &[u8]) -> Cow<'_, str> {
    let mut end = 0;
    for line in payload.split(|&b| b == b'\n') {
        end = (end + line.len() + 1).min(payload.len());
        if line.is_empty() || line == b"\r" {
            break;
        }
    }
    String::from_utf8_lossy(&payload[..end])
}

/// Parse a change unit into its descriptor.
pub fn parse(unit: ChangeUnit) -> Result<ChangeDescriptor, ParseError> {
    let header = parse_header(&header_block(&unit.payload)).map_err(|reason| ParseError {
        name: unit.name.clone(),
        locator: unit.origin.locator().to_string(),
        reason,
    })?;
    debug!(
        change = %unit.name,
        timestamp = %header.timestamp,
        subject = %header.subject,
        "parsed change header"
    );
    Ok(ChangeDescriptor {
        author: header.author,
        timestamp: header.timestamp,
        subject: header.subject,
        unit,
    })
}
