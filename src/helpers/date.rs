//! Date helper functions

use chrono::NaiveDate;

/// Format a backend date string in long form (like "January 2, 2024")
///
/// The content API sends dates as strings, either a bare date or an
/// RFC 3339 timestamp. Anything unparseable is shown as-is rather than
/// failing the page.
pub fn display_date(raw: &str) -> String {
    if let Some(date) = parse_date(raw) {
        // %-d would be nicer but is platform-dependent; strip the pad
        let formatted = date.format("%B %d, %Y").to_string();
        return formatted.replacen(" 0", " ", 1);
    }
    raw.to_string()
}

/// Parse the date portion of a backend date string
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date_plain() {
        assert_eq!(display_date("2024-01-15"), "January 15, 2024");
    }

    #[test]
    fn test_display_date_strips_zero_pad() {
        assert_eq!(display_date("2024-03-02"), "March 2, 2024");
    }

    #[test]
    fn test_display_date_rfc3339() {
        assert_eq!(display_date("2024-06-30T12:00:00.000Z"), "June 30, 2024");
    }

    #[test]
    fn test_display_date_unparseable_passes_through() {
        assert_eq!(display_date("someday"), "someday");
    }
}
