//! Change descriptor parsing for monoize.
//!
//! Reads the fixed mailbox header of an exported change:
//!
//! ```text
//! From <object id> <envelope date>        (discarded)
//! From: <author>
//! Date: <Www, D Mmm YYYY HH:MM:SS +ZZZZ>
//! Subject: <subject>
//! ```
//!
//! Parsing is strict. A missing line, a line without its prefix, or a date in
//! any other layout is rejected, because the date decides where the change
//! lands in the global order.

pub mod date;
pub mod error;
pub mod header;

pub use date::{parse_date, DATE_FORMAT};
pub use error::{HeaderError, HeaderField, ParseError};
pub use header::{parse, parse_header, ChangeHeader, AUTHOR_PREFIX, DATE_PREFIX, SUBJECT_PREFIX};
