use chrono::{DateTime, NaiveDate, NaiveTime};

/// Only used when the value starts with a four-digit year.
const YEAR_FIRST_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// `%y` goes before `%Y`: chrono happily reads "24" as the year 24 AD.
const DAY_FIRST_FORMATS: [&str; 7] = [
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d %b %Y", "%d %B %Y", "%d-%b-%Y",
];

/// Parse a raw `Date` cell with day-before-month interpretation.
///
/// A trailing time of day (`HH:MM[:SS]`, after a space or `T`) is ignored, as is
/// the time and offset of a full RFC 3339 timestamp.
/// Returns `None` for anything unparseable instead of failing.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_matches('"').trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.date_naive());
    }
    if let Some(date) = parse_date_part(s) {
        return Some(date);
    }

    let idx = s.rfind([' ', 'T'])?;
    if !is_time_of_day(s[idx + 1..].trim()) {
        return None;
    }
    parse_date_part(s[..idx].trim())
}

fn parse_date_part(s: &str) -> Option<NaiveDate> {
    let formats: &[&str] = if starts_with_year(s) {
        &YEAR_FIRST_FORMATS
    } else {
        &DAY_FIRST_FORMATS
    };
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn starts_with_year(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() > 4 && b[..4].iter().all(u8::is_ascii_digit) && matches!(b[4], b'-' | b'/')
}

fn is_time_of_day(s: &str) -> bool {
    ["%H:%M:%S", "%H:%M", "%H:%M:%S%.f"]
        .iter()
        .any(|fmt| NaiveTime::parse_from_str(s, fmt).is_ok())
}
