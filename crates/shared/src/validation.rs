//! Common validation utilities.

use validator::ValidationError;


/// Maximum length of a free-text search term.
pub const MAX_SEARCH_LENGTH: usize = 200;

/// Parses a record id from user input.
///
/// Record ids are positive integers assigned by the record API. Anything else
/// (empty, non-numeric, zero, negative) yields `None`.
pub fn parse_record_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Values that may carry a record id.
pub trait AsRecordId {
    fn as_record_id(&self) -> Option<i64>;
}

impl AsRecordId for i64 {
    fn as_record_id(&self) -> Option<i64> {
        Some(*self).filter(|id| *id > 0)
    }
}

impl AsRecordId for i32 {
    fn as_record_id(&self) -> Option<i64> {
        i64::from(*self).as_record_id()
    }
}

impl AsRecordId for u32 {
    fn as_record_id(&self) -> Option<i64> {
        i64::from(*self).as_record_id()
    }
}

impl AsRecordId for str {
    fn as_record_id(&self) -> Option<i64> {
        parse_record_id(self)
    }
}

impl AsRecordId for String {
    fn as_record_id(&self) -> Option<i64> {
        parse_record_id(self)
    }
}

impl<T: AsRecordId + ?Sized> AsRecordId for &T {
    fn as_record_id(&self) -> Option<i64> {
        (**self).as_record_id()
    }
}

impl<T: AsRecordId> AsRecordId for Option<T> {
    fn as_record_id(&self) -> Option<i64> {
        self.as_ref().and_then(AsRecordId::as_record_id)
    }
}

/// Coerces ids to integers, dropping invalid ones and duplicates.
///
/// First-seen order is preserved.
pub fn normalize_record_ids<T: AsRecordId>(ids: &[T]) -> Vec<i64> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids.iter().filter_map(AsRecordId::as_record_id) {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Validates a free-text search term.
pub fn validate_search_term(term: &str) -> Result<(), ValidationError> {
    if term.chars().count() > MAX_SEARCH_LENGTH {
        let mut err = ValidationError::new("search_length");
        err.message = Some("Search term must be at most 200 characters".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_id_valid() {
        assert_eq!(parse_record_id("42"), Some(42));
        assert_eq!(parse_record_id(" 7 "), Some(7));
    }

    #[test]
    fn test_parse_record_id_invalid() {
        assert_eq!(parse_record_id("abc"), None);
        assert_eq!(parse_record_id(""), None);
        assert_eq!(parse_record_id("0"), None);
        assert_eq!(parse_record_id("-5"), None);
        assert_eq!(parse_record_id("12abc"), None);
    }

    #[test]
    fn test_normalize_record_ids_dedupes() {
        assert_eq!(normalize_record_ids(&[1i64, 1, 2]), vec![1, 2]);
    }

    #[test]
    fn test_normalize_record_ids_coerces_strings() {
        let ids = ["3", "x", "3", "4"];
        assert_eq!(normalize_record_ids(&ids), vec![3, 4]);
    }

    #[test]
    fn test_normalize_record_ids_empty() {
        let ids: [i64; 0] = [];
        assert!(normalize_record_ids(&ids).is_empty());
    }

    #[test]
    fn test_normalize_optional_ids() {
        let ids = [Some(5i64), None, Some(5)];
        assert_eq!(normalize_record_ids(&ids), vec![5]);
    }

    #[test]
    fn test_validate_search_term() {
        assert!(validate_search_term("payment").is_ok());
        assert!(validate_search_term(&"x".repeat(201)).is_err());
        assert!(validate_search_term(&"x".repeat(200)).is_ok());
    }
}
