//! Compact duration tokens such as `1h30m`, `45m` or `90s`
//!
//! Each run of digits counts only when it is immediately closed by a unit
//! letter (`h`, `m`, `s`, any case). Other characters are skipped without
//! resetting the pending digits, and digits left over at the end are
//! dropped, so `"100"` is zero seconds.

use std::time::Duration;

fn unit_seconds(c: char) -> Option<u64> {
    match c.to_ascii_lowercase() {
        'h' => Some(3600),
        'm' => Some(60),
        's' => Some(1),
        _ => None,
    }
}

/// Total number of seconds described by `input`
pub fn parse_duration_secs(input: &str) -> u64 {
    let mut total: u64 = 0;
    let mut pending: Option<u64> = None;

    for c in input.chars() {
        if let Some(digit) = c.to_digit(10) {
            let value = pending.unwrap_or(0);
            pending = Some(value.saturating_mul(10).saturating_add(u64::from(digit)));
        } else if let Some(unit) = unit_seconds(c) {
            if let Some(value) = pending.take() {
                total = total.saturating_add(value.saturating_mul(unit));
            }
        }
    }

    total
}

pub fn parse_duration(input: &str) -> Duration {
    Duration::from_secs(parse_duration_secs(input))
}

/// Whether `input` ends in a unit letter, i.e. reads as a duration rather
/// than a clock time
pub fn looks_like_duration(input: &str) -> bool {
    input
        .trim()
        .chars()
        .last()
        .is_some_and(|c| unit_seconds(c).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_common_tokens() {
        assert_eq!(parse_duration_secs("1h30m"), 5400);
        assert_eq!(parse_duration_secs("45m"), 2700);
        assert_eq!(parse_duration_secs("90s"), 90);
        assert_eq!(parse_duration_secs("2h"), 7200);
        assert_eq!(parse_duration_secs("1h1m1s"), 3661);
    }

    #[test]
    fn test_digits_without_unit_are_dropped() {
        assert_eq!(parse_duration_secs("100"), 0);
        assert_eq!(parse_duration_secs("5m30"), 300);
        assert_eq!(parse_duration_secs(""), 0);
    }

    #[test]
    fn test_mixed_case_units() {
        assert_eq!(parse_duration_secs("1H2M"), parse_duration_secs("1h2m"));
        assert_eq!(parse_duration_secs("10S"), 10);
    }

    #[test]
    fn test_unknown_characters_are_ignored() {
        assert_eq!(parse_duration_secs("25 minutes"), 25 * 60);
        assert_eq!(parse_duration_secs("h"), 0);
        assert_eq!(parse_duration_secs("x5s!"), 5);
    }

    #[test]
    fn test_overflow_saturates() {
        assert_eq!(parse_duration_secs("99999999999999999999999h"), u64::MAX);
    }

    #[test]
    fn test_looks_like_duration() {
        assert!(looks_like_duration("1h30m"));
        assert!(looks_like_duration("20M "));
        assert!(!looks_like_duration("14:30"));
        assert!(!looks_like_duration(""));
    }

    proptest! {
        #[test]
        fn concatenation_adds(h in 0u64..1000, m in 0u64..1000, s in 0u64..1000) {
            let token = format!("{}h{}m{}s", h, m, s);
            prop_assert_eq!(parse_duration_secs(&token), h * 3600 + m * 60 + s);
        }

        #[test]
        fn case_does_not_matter(token in "[0-9hmsHMS]{0,12}") {
            prop_assert_eq!(
                parse_duration_secs(&token),
                parse_duration_secs(&token.to_ascii_lowercase())
            );
        }

        #[test]
        fn bare_digits_are_zero(digits in "[0-9]{1,18}") {
            prop_assert_eq!(parse_duration_secs(&digits), 0);
        }
    }
}
