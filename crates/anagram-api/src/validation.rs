//! Request input validation
//!
//! Words must be ASCII letters only. Stats ranges are either fully absent or two
//! well-formed `YYYY-MM-DDTHH:mm:ss` timestamps (read as UTC) with `from < to`.

use crate::error::{ApiError, ApiResult};
use anagram_types::TimeWindow;
use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

pub const WORD_REQUIRED: &str = "Word parameter is required in the request body";
pub const WORD_INVALID: &str = "Word parameter must contain letters only";
pub const RANGE_INVALID: &str = "Range parameters 'from' or 'to' are invalid.";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z]+$").unwrap_or_else(|e| panic!("invalid word pattern: {e}"))
});

static TIMESTAMP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}$")
        .unwrap_or_else(|e| panic!("invalid timestamp pattern: {e}"))
});

/// Check that a word was supplied and is letters only.
pub fn validate_word(word: Option<&str>) -> ApiResult<&str> {
    match word {
        None | Some("") => Err(ApiError::validation(WORD_REQUIRED)),
        Some(word) if WORD_PATTERN.is_match(word) => Ok(word),
        Some(_) => Err(ApiError::validation(WORD_INVALID)),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if !TIMESTAMP_PATTERN.is_match(value) {
        return None;
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok().map(|naive| naive.and_utc())
}

/// Turn optional `from`/`to` query values into an optional window.
///
/// Both absent means no filter. One bound alone, a malformed bound or
/// `from >= to` is a validation error.
pub fn validate_range(from: Option<&str>, to: Option<&str>) -> ApiResult<Option<TimeWindow>> {
    let (from, to) = match (from, to) {
        (None, None) => return Ok(None),
        (Some(from), Some(to)) => (from, to),
        _ => return Err(ApiError::validation(RANGE_INVALID)),
    };

    let from = parse_timestamp(from).ok_or_else(|| ApiError::validation(RANGE_INVALID))?;
    let to = parse_timestamp(to).ok_or_else(|| ApiError::validation(RANGE_INVALID))?;
    TimeWindow::new(from, to).map(Some).ok_or_else(|| ApiError::validation(RANGE_INVALID))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_word_validation() {
        assert_eq!(validate_word(Some("Listen")).unwrap(), "Listen");
        assert!(validate_word(None).is_err());
        assert!(validate_word(Some("")).is_err());
        assert!(validate_word(Some("can't")).is_err());
        assert!(validate_word(Some("two words")).is_err());
        assert!(validate_word(Some("café")).is_err());
        assert!(validate_word(Some("abc1")).is_err());
    }

    #[test]
    fn test_missing_word_message() {
        let err = validate_word(None).unwrap_err();
        assert_eq!(err.to_string(), WORD_REQUIRED);
    }

    #[test]
    fn test_absent_range_is_unfiltered() {
        assert!(validate_range(None, None).unwrap().is_none());
    }

    #[test]
    fn test_range_is_read_as_utc() {
        let window = validate_range(Some("2024-01-02T00:00:00"), Some("2024-01-02T12:30:00"))
            .unwrap()
            .unwrap();
        assert_eq!(window.from(), Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(window.to(), Utc.with_ymd_and_hms(2024, 1, 2, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_invalid_ranges() {
        let cases = [
            (Some("2024-01-02T00:00:00"), None),
            (None, Some("2024-01-02T00:00:00")),
            (Some("2024-01-02"), Some("2024-01-03")),
            (Some("2024-01-02T00:00:00Z"), Some("2024-01-03T00:00:00Z")),
            (Some("2024-13-02T00:00:00"), Some("2024-13-03T00:00:00")),
            (Some("2024-01-03T00:00:00"), Some("2024-01-02T00:00:00")),
            (Some("2024-01-02T00:00:00"), Some("2024-01-02T00:00:00")),
        ];
        for (from, to) in cases {
            let err = validate_range(from, to).unwrap_err();
            assert_eq!(err.error_type(), "Validation", "{from:?} .. {to:?}");
        }
    }
}
