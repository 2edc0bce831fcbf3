//! Trip date-range validation.

use chrono::NaiveDate;

/// Strict ISO calendar date format for trip dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date in strict zero-padded ISO form. chrono alone would accept
/// non-padded digits like `2024-5-1`, so the parsed date must render back
/// to exactly the input text.
fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(input, DATE_FORMAT).ok()?;
    if date.format(DATE_FORMAT).to_string() == input {
        Some(date)
    } else {
        None
    }
}

/// Validate the start/end date pair of a trip.
///
/// The start date is mandatory and must parse under [`DATE_FORMAT`]. A
/// blank end date keeps the trip open-ended and is valid; a present end
/// date must parse and must not precede the start (equal dates pass).
/// Callers get a single boolean signal, no per-field detail.
pub fn validate_date_range(date_start: &str, date_end: &str) -> bool {
    let start = match parse_iso_date(date_start) {
        Some(date) => date,
        None => return false,
    };
    if date_end.trim().is_empty() {
        return true;
    }
    match parse_iso_date(date_end) {
        Some(end) => end >= start,
        None => false,
    }
}
