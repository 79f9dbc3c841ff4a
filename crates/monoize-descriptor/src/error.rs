use std::fmt;

use thiserror::Error;

/// The header lines of an exported change, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderField {
    Envelope,
    Author,
    Date,
    Subject,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Envelope => "envelope",
            Self::Author => "author",
            Self::Date => "date",
            Self::Subject => "subject",
        };
        f.write_str(name)
    }
}

/// What is wrong with a header.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("missing {0} line")]
    MissingLine(HeaderField),

    #[error("expected {field} line starting with `{prefix}`, found `{found}`")]
    UnexpectedLine {
        field: HeaderField,
        prefix: &'static str,
        found: String,
    },

    #[error("date `{value}` is not in `Www, D Mmm YYYY HH:MM:SS +ZZZZ` form: {reason}")]
    InvalidDate { value: String, reason: String },
}

/// A change unit whose header could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed header in change `{name}` from `{locator}`: {reason}")]
pub struct ParseError {
    pub name: String,
    pub locator: String,
    #[source]
    pub reason: HeaderError,
}
