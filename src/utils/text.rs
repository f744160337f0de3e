use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static LABELED_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)DATE[:\s]*(\d{1,2}/\d{1,2}/\d{4})").unwrap());

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2}/\d{1,2}/\d{4})").unwrap());

/// Strip thousands separators from a digit-group string ("1,234" -> "1234").
pub fn normalize_digits(raw: &str) -> String {
    raw.replace(',', "")
}

/// Find a report date in a text span and normalize it to YYYY-MM-DD.
///
/// Accepts either a labeled `DATE: MM/DD/YYYY` form (preferred) or a bare
/// `MM/DD/YYYY`. A match that is not a real calendar date is returned as the
/// raw matched text; a span without any date-shaped text yields `None`.
pub fn resolve_date(span: &str) -> Option<String> {
    let raw = LABELED_DATE_RE
        .captures(span)
        .or_else(|| DATE_RE.captures(span))
        .map(|c| c[1].to_string())?;

    match NaiveDate::parse_from_str(&raw, "%m/%d/%Y") {
        Ok(date) => Some(date.format("%Y-%m-%d").to_string()),
        Err(_) => Some(raw),
    }
}

/// Clip a snippet to at most `max_chars` characters from the start of `text`.
pub fn clip_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Clip a snippet starting at byte offset `start` (a regex match boundary).
pub fn clip_from(text: &str, start: usize, max_chars: usize) -> String {
    clip_chars(&text[start..], max_chars)
}

/// Collapse newlines so a snippet stays on one audit row.
pub fn collapse_newlines(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_digits_strips_separators() {
        assert_eq!(normalize_digits("1,234"), "1234");
        assert_eq!(normalize_digits("1,234,567"), "1234567");
    }

    #[test]
    fn test_normalize_digits_identity_without_separators() {
        assert_eq!(normalize_digits("45"), "45");
        assert_eq!(normalize_digits("0"), "0");
    }

    #[test]
    fn test_resolve_labeled_date() {
        assert_eq!(
            resolve_date("DATE: 03/14/2024").as_deref(),
            Some("2024-03-14")
        );
    }

    #[test]
    fn test_resolve_bare_date() {
        assert_eq!(
            resolve_date("inspected on 7/4/2023 by staff").as_deref(),
            Some("2023-07-04")
        );
    }

    #[test]
    fn test_resolve_date_without_match() {
        assert_eq!(resolve_date("no dates here"), None);
        assert_eq!(resolve_date(""), None);
    }

    #[test]
    fn test_resolve_date_falls_back_to_raw_text() {
        // month 13 is date-shaped but not a calendar date
        assert_eq!(resolve_date("DATE: 13/45/2024").as_deref(), Some("13/45/2024"));
    }

    #[test]
    fn test_clip_chars_respects_multibyte_boundaries() {
        assert_eq!(clip_chars("héllo", 2), "hé");
        assert_eq!(clip_chars("abc", 10), "abc");
    }

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(collapse_newlines("a\nb\r\nc"), "a b  c");
    }
}
