//! Start eligibility.
//!
//! A tour activates on a visibility true-transition only when it has not
//! been completed before (persisted flag) and has not expired. Both axes
//! degrade towards eligibility: a missing key means "never shown", an
//! unparsable expiry date means "never expires".

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::storage;

/// Parse an expiry date of the form `YYYY-MM-DD` (`-` is normalized to the
/// `/` separator first, so both spellings are accepted). The tour is
/// eligible up to and including midnight of that day.
pub(crate) fn parse_expire_date(raw: &str) -> Option<NaiveDateTime> {
    let normalized = raw.replace('-', "/");
    NaiveDate::parse_from_str(&normalized, "%Y/%m/%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Decide whether a visibility true-transition starts the tour.
pub(crate) fn evaluate(seen: Option<&str>, expire_date: Option<&str>, now: NaiveDateTime) -> bool {
    if storage::is_truthy(seen) {
        return false;
    }
    match expire_date.and_then(parse_expire_date) {
        Some(expiry) => now <= expiry,
        None => true,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str) -> NaiveDateTime {
        parse_expire_date(date).expect("test date parses")
    }

    #[test]
    fn completed_tours_never_start() {
        assert!(!evaluate(Some("true"), None, at("2026-01-01")));
        // Any non-empty persisted value counts as completed.
        assert!(!evaluate(Some("1"), None, at("2026-01-01")));
    }

    #[test]
    fn missing_or_empty_flag_means_never_shown() {
        assert!(evaluate(None, None, at("2026-01-01")));
        assert!(evaluate(Some(""), None, at("2026-01-01")));
    }

    #[test]
    fn expiry_gates_on_the_current_time() {
        let expire = Some("2026-06-01");
        assert!(evaluate(None, expire, at("2026-05-31")));
        assert!(evaluate(None, expire, at("2026-06-01")));
        assert!(!evaluate(None, expire, at("2026-06-02")));
    }

    #[test]
    fn expired_tours_stay_ineligible_even_without_completion() {
        assert!(!evaluate(None, Some("2000-01-01"), at("2026-01-01")));
    }

    #[test]
    fn unparsable_expiry_never_expires() {
        assert!(evaluate(None, Some("soon"), at("2026-01-01")));
        assert!(evaluate(None, Some(""), at("2026-01-01")));
    }

    #[test]
    fn slash_separated_dates_parse_too() {
        assert_eq!(parse_expire_date("2026/06/01"), parse_expire_date("2026-06-01"));
        assert!(parse_expire_date("2026-06-01").is_some());
    }
}
