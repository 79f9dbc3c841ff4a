use chrono::{DateTime, FixedOffset};

use crate::error::HeaderError;

/// The only accepted date layout, e.g. `Mon, 2 Jan 2006 15:04:05 -0700`.
pub const DATE_FORMAT: &str = "%a, %-d %b %Y %H:%M:%S %z";

/// Layout used to parse once the shape has been checked; chrono's `%d`
/// accepts one or two digits when parsing.
const PARSE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

const WEEKDAYS: &[&str] = &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTHS: &[&str] = &[
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Parse a header date in the fixed layout.
///
/// chrono alone is lenient about several parts of the layout (long weekday
/// names, `+07:00` offsets, letter case), so the token shape is checked
/// first and chrono only does the calendar arithmetic. A weekday that does
/// not match the calendar date is rejected.
///
/// ```
/// use monoize_descriptor::parse_date;
///
/// let ts = parse_date("Mon, 2 Jan 2006 15:04:05 -0700").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2006-01-02T15:04:05-07:00");
/// assert!(parse_date("2006-01-02T15:04:05-07:00").is_err());
/// ```
pub fn parse_date(value: &str) -> Result<DateTime<FixedOffset>, HeaderError> {
    let invalid = |reason: &str| HeaderError::InvalidDate {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = value.split(' ').collect();
    let [weekday, day, month, year, time, offset] = parts.as_slice() else {
        return Err(invalid("expected six space-separated fields"));
    };

    match weekday.strip_suffix(',') {
        Some(name) if WEEKDAYS.contains(&name) => {}
        _ => return Err(invalid("bad weekday")),
    }
    if !(1..=2).contains(&day.len()) || !all_digits(day) {
        return Err(invalid("bad day"));
    }
    if !MONTHS.contains(month) {
        return Err(invalid("bad month"));
    }
    if year.len() != 4 || !all_digits(year) {
        return Err(invalid("bad year"));
    }
    if !is_clock(time) {
        return Err(invalid("bad time of day"));
    }
    if !is_offset(offset) {
        return Err(invalid("bad UTC offset"));
    }

    DateTime::parse_from_str(value, PARSE_FORMAT).map_err(|e| invalid(&e.to_string()))
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `HH:MM:SS`
fn is_clock(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 8
        && b[2] == b':'
        && b[5] == b':'
        && [0, 1, 3, 4, 6, 7].iter().all(|&i| b[i].is_ascii_digit())
}

/// `+HHMM` or `-HHMM`
fn is_offset(s: &str) -> bool {
    match s.as_bytes() {
        [b'+' | b'-', rest @ ..] => rest.len() == 4 && rest.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_reference_layout() {
        let ts = parse_date("Mon, 2 Jan 2006 15:04:05 -0700").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -7 * 3600);
        assert_eq!(
            ts.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 5).unwrap()
        );
    }

    #[test]
    fn accepts_two_digit_day() {
        assert!(parse_date("Sat, 12 Jun 2021 08:00:00 +0200").is_ok());
        assert!(parse_date("Sat, 02 Jan 2021 08:00:00 +0000").is_ok());
    }

    #[test]
    fn rejects_other_layouts() {
        let bad = [
            "",
            "2006-01-02T15:04:05-07:00",
            "Mon, 2 Jan 2006 15:04:05",
            "Mon, 2 Jan 2006 15:04:05 -07:00",
            "Mon, 2 Jan 2006 15:04:05 MST",
            "Monday, 2 Jan 2006 15:04:05 -0700",
            "Mon 2 Jan 2006 15:04:05 -0700",
            "mon, 2 Jan 2006 15:04:05 -0700",
            "Mon, 2 January 2006 15:04:05 -0700",
            "Mon, 2 Jan 06 15:04:05 -0700",
            "Mon, 2 Jan 2006 15:04 -0700",
            "Mon,  2 Jan 2006 15:04:05 -0700",
            "Mon, 2 Jan 2006 15:04:05 -0700 ",
            "Mon, 123 Jan 2006 15:04:05 -0700",
        ];
        for value in bad {
            assert!(parse_date(value).is_err(), "expected `{value}` to be rejected");
        }
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(parse_date("Mon, 32 Jan 2006 15:04:05 -0700").is_err());
        assert!(parse_date("Mon, 2 Jan 2006 25:04:05 -0700").is_err());
        // 2 Jan 2006 was a Monday.
        assert!(parse_date("Tue, 2 Jan 2006 15:04:05 -0700").is_err());
    }

    proptest! {
        #[test]
        fn formatted_timestamps_parse_back(
            secs in 0i64..4_102_444_800,
            offset_minutes in -(14 * 60i32)..=(14 * 60),
        ) {
            let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
            let ts = offset.timestamp_opt(secs, 0).unwrap();
            let text = ts.format(DATE_FORMAT).to_string();
            let parsed = parse_date(&text).unwrap();
            prop_assert_eq!(parsed, ts);
            prop_assert_eq!(parsed.offset(), ts.offset());
        }
    }
}
