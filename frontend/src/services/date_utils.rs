use chrono::NaiveDate;
use shared::iso_date;

/// Parse a date typed into a form (`YYYY-MM-DD`, a trailing time part is
/// ignored). Blank input yields `None`.
pub fn parse_form_date(input: &str) -> Option<NaiveDate> {
    if input.trim().is_empty() {
        return None;
    }
    iso_date::parse(input)
}

/// Format a date for a date input field
pub fn to_form_date(date: NaiveDate) -> String {
    date.format(iso_date::FORMAT).to_string()
}

/// Format a date for display, e.g. "05 Jan 2024"
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Format a trip's date range for display
pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", format_display_date(start), format_display_date(end))
}
