//! ID generation for netcrowd reports
//!
//! Sequential, human-friendly IDs. Format: PREFIX-NNN (zero-padded to at
//! least 3 digits, e.g. RPT-001, RPT-042, RPT-1234).

use std::collections::HashSet;

/// Default report ID prefix
pub const DEFAULT_PREFIX: &str = "RPT";

/// Format a report ID from prefix and sequence number
pub fn format_id(prefix: &str, number: u64) -> String {
    format!("{}-{:03}", prefix, number)
}

/// Generate the next free report ID
///
/// The counter starts at `existing + 1` and moves up until it lands on an
/// ID nobody holds, so IDs stay unique after deletions.
pub fn next_report_id<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: HashSet<&str> = existing.into_iter().collect();
    let mut counter = taken.len() as u64 + 1;
    let mut id = format_id(prefix, counter);

    while taken.contains(id.as_str()) {
        counter += 1;
        id = format_id(prefix, counter);
    }

    id
}

/// Parse a report ID into prefix and sequence number
pub fn parse_id(id: &str) -> Option<(&str, u64)> {
    let (prefix, number) = id.rsplit_once('-')?;
    if prefix.is_empty() || number.len() < 3 || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((prefix, number.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_id() {
        assert_eq!(next_report_id(DEFAULT_PREFIX, std::iter::empty()), "RPT-001");
    }

    #[test]
    fn test_skips_taken_ids() {
        // RPT-001 was deleted, two remain: counter starts at 3, which is taken
        let id = next_report_id("RPT", ["RPT-002", "RPT-003"]);
        assert_eq!(id, "RPT-004");
    }

    #[test]
    fn test_reuses_gap_above_count() {
        let id = next_report_id("RPT", ["RPT-001", "RPT-005"]);
        assert_eq!(id, "RPT-003");
    }

    #[test]
    fn test_wide_numbers() {
        assert_eq!(format_id("RPT", 1234), "RPT-1234");
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("RPT-007"), Some(("RPT", 7)));
        assert_eq!(parse_id("RPT-1234"), Some(("RPT", 1234)));
        assert_eq!(parse_id("RPT-7"), None);
        assert_eq!(parse_id("RPT-abc"), None);
        assert_eq!(parse_id("007"), None);
    }
}
