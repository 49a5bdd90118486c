//! SQLite helper utilities for ids, timestamps, case folding and error classification
//!
//! SQLite has no native UUID or timestamp type; both are stored as TEXT.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Generate a new record id
#[inline]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Get current UTC timestamp as ISO8601 string for SQLite
///
/// Fixed precision keeps lexical order equal to chronological order.
#[inline]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Case-fold text for the `*_fold` shadow columns, with full Unicode rules
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Whether a store error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_sort_lexically() {
        let first = now_iso8601();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = now_iso8601();
        assert!(first < second);
        assert!(first.ends_with('Z'));
    }

    #[test]
    fn folding_covers_non_ascii() {
        assert_eq!(fold_case("École ÜBER"), "école über");
        assert_eq!(fold_case("éCOLE"), fold_case("École"));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
