//! Checkers for the `format` keyword.
//!
//! Formats are advisory by default; the validator consults this module
//! only when format assertion is enabled. Unknown format names always
//! pass, and every checker applies to strings only.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("invalid date regex"));

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(?:\.\d+)?(?:[zZ]|[+-](\d{2}):(\d{2}))$")
        .expect("invalid time regex")
});

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("invalid uuid regex")
});

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("invalid email regex"));

/// Whether `value` conforms to the named format. `true` for format
/// names this engine does not know.
pub(crate) fn matches_format(name: &str, value: &str) -> bool {
    match name {
        "date" => is_date(value),
        "date-time" => is_date_time(value),
        "time" => is_time(value),
        "duration" => is_duration(value),
        "email" => EMAIL.is_match(value),
        "ipv4" => value.parse::<Ipv4Addr>().is_ok(),
        "ipv6" => value.parse::<Ipv6Addr>().is_ok(),
        "uuid" => UUID.is_match(value),
        "uri" => Url::parse(value).is_ok(),
        _ => true,
    }
}

fn is_date(value: &str) -> bool {
    let Some(parts) = DATE.captures(value) else {
        return false;
    };
    let year: i32 = parts[1].parse().unwrap_or(0);
    let month: u32 = parts[2].parse().unwrap_or(0);
    let day: u32 = parts[3].parse().unwrap_or(0);
    (1..=12).contains(&month) && day >= 1 && day <= days_in_month(year, month)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn is_time(value: &str) -> bool {
    let Some(parts) = TIME.captures(value) else {
        return false;
    };
    let hour: u32 = parts[1].parse().unwrap_or(99);
    let minute: u32 = parts[2].parse().unwrap_or(99);
    // 60 is admitted for leap seconds, as RFC 3339 does.
    let second: u32 = parts[3].parse().unwrap_or(99);
    let offset_ok = match (parts.get(4), parts.get(5)) {
        (Some(oh), Some(om)) => {
            oh.as_str().parse::<u32>().unwrap_or(99) < 24
                && om.as_str().parse::<u32>().unwrap_or(99) < 60
        }
        _ => true,
    };
    hour < 24 && minute < 60 && second <= 60 && offset_ok
}

fn is_date_time(value: &str) -> bool {
    let Some(split) = value.find(['T', 't']) else {
        return false;
    };
    is_date(&value[..split]) && is_time(&value[split + 1..])
}

/// ISO 8601 duration: `P` followed by date components, optionally a `T`
/// followed by time components; at least one component overall, and the
/// `T` must introduce at least one.
fn is_duration(value: &str) -> bool {
    let Some(mut rest) = value.strip_prefix('P') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    // Weeks are their own form and combine with nothing else.
    if let Some(weeks) = rest.strip_suffix('W') {
        return !weeks.is_empty() && weeks.bytes().all(|b| b.is_ascii_digit());
    }
    let mut seen_any = false;
    for designator in ['Y', 'M', 'D'] {
        rest = consume_component(rest, designator, false, &mut seen_any);
    }
    if let Some(mut time) = rest.strip_prefix('T') {
        let before_time = time;
        time = consume_component(time, 'H', false, &mut seen_any);
        time = consume_component(time, 'M', false, &mut seen_any);
        // Seconds may carry a decimal fraction.
        time = consume_component(time, 'S', true, &mut seen_any);
        // `T` with nothing after it, or trailing garbage.
        if time == before_time || !time.is_empty() {
            return false;
        }
    } else if !rest.is_empty() {
        return false;
    }
    seen_any
}

fn consume_component<'a>(
    input: &'a str,
    designator: char,
    allow_fraction: bool,
    seen_any: &mut bool,
) -> &'a str {
    let digits = input.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return input;
    }
    let mut end = digits;
    if allow_fraction && input[end..].starts_with('.') {
        let fraction = input[end + 1..].bytes().take_while(|b| b.is_ascii_digit()).count();
        if fraction == 0 {
            return input;
        }
        end += 1 + fraction;
    }
    if input[end..].starts_with(designator) {
        *seen_any = true;
        &input[end + designator.len_utf8()..]
    } else {
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates() {
        assert!(matches_format("date", "2024-02-29"));
        assert!(matches_format("date", "1999-12-31"));
        assert!(!matches_format("date", "2023-02-29"));
        assert!(!matches_format("date", "2024-13-01"));
        assert!(!matches_format("date", "2024-00-10"));
        assert!(!matches_format("date", "2024-1-1"));
        assert!(!matches_format("date", "yesterday"));
    }

    #[test]
    fn times() {
        assert!(matches_format("time", "23:59:59Z"));
        assert!(matches_format("time", "00:00:00+09:00"));
        assert!(matches_format("time", "12:30:45.123z"));
        assert!(matches_format("time", "23:59:60Z"));
        assert!(!matches_format("time", "24:00:00Z"));
        assert!(!matches_format("time", "12:61:00Z"));
        assert!(!matches_format("time", "12:30:45"));
    }

    #[test]
    fn date_times() {
        assert!(matches_format("date-time", "2024-02-29T23:59:59Z"));
        assert!(matches_format("date-time", "1985-04-12t23:20:50.52-07:00"));
        assert!(!matches_format("date-time", "2024-02-29 23:59:59Z"));
        assert!(!matches_format("date-time", "2024-02-30T00:00:00Z"));
    }

    #[test]
    fn durations() {
        for valid in ["P1Y", "P3M", "P4W", "P1DT12H", "PT5M", "PT0S", "PT0.5S", "P1Y2M3DT4H5M6S"] {
            assert!(matches_format("duration", valid), "rejected {valid}");
        }
        for invalid in ["P", "PT", "1Y", "P1H", "P4W2D", "P1Y junk"] {
            assert!(!matches_format("duration", invalid), "accepted {invalid}");
        }
    }

    #[test]
    fn addresses() {
        assert!(matches_format("ipv4", "127.0.0.1"));
        assert!(!matches_format("ipv4", "256.1.1.1"));
        assert!(!matches_format("ipv4", "1.2.3"));
        assert!(matches_format("ipv6", "::1"));
        assert!(matches_format("ipv6", "2001:db8::8a2e:370:7334"));
        assert!(!matches_format("ipv6", "12345::"));
    }

    #[test]
    fn identifiers_and_uris() {
        assert!(matches_format("uuid", "123e4567-e89b-12d3-a456-426614174000"));
        assert!(!matches_format("uuid", "123e4567e89b12d3a456426614174000"));
        assert!(matches_format("uri", "https://example.com/a?b=c"));
        assert!(!matches_format("uri", "not a uri"));
        assert!(matches_format("email", "user@example.com"));
        assert!(!matches_format("email", "no-at-sign"));
        assert!(!matches_format("email", "two@@signs"));
    }

    #[test]
    fn unknown_formats_pass() {
        assert!(matches_format("hostname", "anything goes"));
        assert!(matches_format("made-up", ""));
    }
}
