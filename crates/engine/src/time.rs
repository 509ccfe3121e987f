use std::sync::LazyLock;

use regex::Regex;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;

/// Strict grammar for committed times: optional `h:` prefix, minutes in
/// `[0, 59]` with one or two digits, seconds in `[0, 59]` with exactly two.
/// ASCII digits only; `\d` would also admit other Unicode digits.
static COMMIT_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]+:)?[0-5]?[0-9]:[0-5][0-9]$")
        .expect("commit time pattern must compile")
});

/// Cleans a partially typed time string on every keystroke.
///
/// Characters other than digits and `:` are dropped. Up to two segments are
/// read as `m:ss`, three or more as `h:mm:ss` (extra segments are ignored).
/// The seconds segment is right-padded with `0` and cut to two digits;
/// missing segments take their defaults, so blank input reads as `0:00`.
/// When `duration_seconds` is known (non-zero) and the typed value lies past
/// it, the canonical form of `duration_seconds` is returned instead.
///
/// # Example
/// ```
/// use stamp_engine::time::sanitize_live_input;
///
/// assert_eq!(sanitize_live_input("1:5", 0), "1:50");
/// assert_eq!(sanitize_live_input("a1b:2c3", 0), "1:23");
/// assert_eq!(sanitize_live_input("9:59", 125), "2:05");
/// assert_eq!(sanitize_live_input("", 0), "0:00");
/// ```
pub fn sanitize_live_input(raw: &str, duration_seconds: u64) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == ':')
        .collect();

    let segments: Vec<&str> = cleaned.split(':').collect();
    let (text, total) = if segments.len() <= 2 {
        let minutes = segment_or(segments.first().copied(), "0");
        let seconds = pad_seconds(segments.get(1).copied());
        let total = segment_value(minutes)
            .saturating_mul(SECONDS_PER_MINUTE)
            .saturating_add(segment_value(&seconds));
        (format!("{minutes}:{seconds}"), total)
    } else {
        let hours = segment_or(segments.first().copied(), "0");
        let minutes = segment_or(segments.get(1).copied(), "00");
        let seconds = pad_seconds(segments.get(2).copied());
        let total = segment_value(hours)
            .saturating_mul(SECONDS_PER_HOUR)
            .saturating_add(segment_value(minutes).saturating_mul(SECONDS_PER_MINUTE))
            .saturating_add(segment_value(&seconds));
        (format!("{hours}:{minutes}:{seconds}"), total)
    };

    if duration_seconds > 0 && total > duration_seconds {
        return format_seconds(duration_seconds);
    }
    text
}

/// Best-effort decode of `m:ss` or `h:mm:ss` into seconds.
///
/// Any other segment count decodes to `0`. Ranges are not checked; use
/// [`validate_commit_format`] before trusting the value.
///
/// # Example
/// ```
/// use stamp_engine::time::to_seconds;
///
/// assert_eq!(to_seconds("1:05"), 65);
/// assert_eq!(to_seconds("1:01:01"), 3_661);
/// assert_eq!(to_seconds("42"), 0);
/// ```
pub fn to_seconds(time: &str) -> u64 {
    let segments: Vec<u64> = time.split(':').map(segment_value).collect();
    match segments.as_slice() {
        [minutes, seconds] => minutes
            .saturating_mul(SECONDS_PER_MINUTE)
            .saturating_add(*seconds),
        [hours, minutes, seconds] => hours
            .saturating_mul(SECONDS_PER_HOUR)
            .saturating_add(minutes.saturating_mul(SECONDS_PER_MINUTE))
            .saturating_add(*seconds),
        _ => 0,
    }
}

/// Exact decode of a committed time.
///
/// Unlike [`to_seconds`], returns `None` instead of guessing when a segment
/// is not a plain ASCII number or the total does not fit in `u64`.
///
/// # Example
/// ```
/// use stamp_engine::time::checked_seconds;
///
/// assert_eq!(checked_seconds("1:01:01"), Some(3_661));
/// assert_eq!(checked_seconds("99999999999999999999:00:00"), None);
/// ```
pub fn checked_seconds(time: &str) -> Option<u64> {
    let segments = time
        .split(':')
        .map(|segment| {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            segment.parse::<u64>().ok()
        })
        .collect::<Option<Vec<u64>>>()?;
    match segments.as_slice() {
        [minutes, seconds] => minutes
            .checked_mul(SECONDS_PER_MINUTE)?
            .checked_add(*seconds),
        [hours, minutes, seconds] => hours
            .checked_mul(SECONDS_PER_HOUR)?
            .checked_add(minutes.checked_mul(SECONDS_PER_MINUTE)?)?
            .checked_add(*seconds),
        _ => None,
    }
}

/// Formats seconds as `m:ss` below one hour and `h:mm:ss` above.
///
/// # Example
/// ```
/// use stamp_engine::time::format_seconds;
///
/// assert_eq!(format_seconds(65), "1:05");
/// assert_eq!(format_seconds(3_661), "1:01:01");
/// ```
pub fn format_seconds(total_seconds: u64) -> String {
    let hours = total_seconds / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Formats a fractional player position, dropping the sub-second part.
pub fn format_position(position_seconds: f64) -> String {
    format_seconds(whole_seconds(position_seconds))
}

/// Converts a player-reported position or duration to whole seconds.
///
/// Negative and non-finite values map to `0`.
pub fn whole_seconds(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.floor() as u64
}

/// Strict check applied before a timestamp is committed.
///
/// # Example
/// ```
/// use stamp_engine::time::validate_commit_format;
///
/// assert!(validate_commit_format("12:34"));
/// assert!(validate_commit_format("1:12:34"));
/// assert!(!validate_commit_format("60:00"));
/// assert!(!validate_commit_format("1:2"));
/// ```
pub fn validate_commit_format(time: &str) -> bool {
    COMMIT_FORMAT.is_match(time)
}

fn segment_or<'a>(segment: Option<&'a str>, default: &'a str) -> &'a str {
    match segment {
        Some(value) if !value.is_empty() => value,
        _ => default,
    }
}

fn pad_seconds(segment: Option<&str>) -> String {
    let mut seconds: String = segment.unwrap_or_default().chars().take(2).collect();
    while seconds.len() < 2 {
        seconds.push('0');
    }
    seconds
}

fn segment_value(segment: &str) -> u64 {
    let segment = segment.trim();
    match segment.parse::<u64>() {
        Ok(value) => value,
        // Only digit runs too long for u64 land here with a non-empty input.
        Err(_) if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) => u64::MAX,
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        checked_seconds, format_position, format_seconds, sanitize_live_input, to_seconds,
        validate_commit_format, whole_seconds,
    };

    #[test]
    fn formatter_round_trips_through_decoder() {
        for seconds in 0..=359_999 {
            assert_eq!(to_seconds(&format_seconds(seconds)), seconds, "{seconds}");
        }
    }

    #[test]
    fn formatter_switches_to_hours_at_one_hour() {
        assert_eq!(format_seconds(0), "0:00");
        assert_eq!(format_seconds(59), "0:59");
        assert_eq!(format_seconds(3_599), "59:59");
        assert_eq!(format_seconds(3_600), "1:00:00");
        assert_eq!(format_seconds(359_999), "99:59:59");
    }

    #[test]
    fn decoder_rejects_unexpected_segment_counts() {
        assert_eq!(to_seconds(""), 0);
        assert_eq!(to_seconds("90"), 0);
        assert_eq!(to_seconds("1:2:3:4"), 0);
        assert_eq!(to_seconds("75:00"), 4_500);
    }

    #[test]
    fn sanitizer_drops_foreign_characters_and_pads_seconds() {
        assert_eq!(sanitize_live_input("1m:3s", 0), "1:30");
        assert_eq!(sanitize_live_input("12", 0), "12:00");
        assert_eq!(sanitize_live_input(":45", 0), "0:45");
        assert_eq!(sanitize_live_input("1:234", 0), "1:23");
    }

    #[test]
    fn sanitizer_defaults_missing_segments() {
        assert_eq!(sanitize_live_input("", 0), "0:00");
        assert_eq!(sanitize_live_input("abc", 300), "0:00");
        assert_eq!(sanitize_live_input(":", 0), "0:00");
    }

    #[test]
    fn sanitizer_reads_three_segments_as_hours() {
        assert_eq!(sanitize_live_input("1:2:3", 0), "1:2:30");
        assert_eq!(sanitize_live_input("1::", 0), "1:00:00");
        assert_eq!(sanitize_live_input("1:05:07:99", 0), "1:05:07");
    }

    #[test]
    fn sanitizer_keeps_large_values_when_duration_is_unknown() {
        assert_eq!(sanitize_live_input("999:00", 0), "999:00");
    }

    #[test]
    fn sanitizer_clamps_to_known_duration() {
        assert_eq!(sanitize_live_input("10:00", 300), "5:00");
        assert_eq!(sanitize_live_input("2:00:00", 3_725), "1:02:05");
        assert_eq!(sanitize_live_input("4:59", 300), "4:59");
        assert_eq!(sanitize_live_input("5:00", 300), "5:00");
    }

    #[test]
    fn sanitized_value_never_exceeds_known_duration() {
        let inputs = [
            "", "0", ":", "1:", "59:59", "99999999999999999999999:00", "1:2:3", "x7y:8z",
            "12:345:6", "0:99", "3:00:00",
        ];
        for duration in [1, 59, 60, 61, 300, 3_599, 3_600, 7_265] {
            for input in inputs {
                let sanitized = sanitize_live_input(input, duration);
                assert!(
                    to_seconds(&sanitized) <= duration,
                    "{input:?} -> {sanitized:?} exceeds {duration}"
                );
            }
        }
    }

    #[test]
    fn commit_validator_is_strict() {
        assert!(validate_commit_format("0:00"));
        assert!(validate_commit_format("12:34"));
        assert!(validate_commit_format("1:12:34"));
        assert!(validate_commit_format("100:00:00"));
        assert!(!validate_commit_format("60:00"));
        assert!(!validate_commit_format("1:2"));
        assert!(!validate_commit_format("1:60"));
        assert!(!validate_commit_format("12:34 "));
        assert!(!validate_commit_format("1:123:45"));
        assert!(!validate_commit_format(""));
    }

    #[test]
    fn commit_validator_accepts_ascii_digits_only() {
        assert!(!validate_commit_format("٢:1٥:3٠"));
        assert!(!validate_commit_format("1٥:30"));
        assert!(!validate_commit_format("1:3٠"));
        assert!(!validate_commit_format("１２:34"));
    }

    #[test]
    fn checked_decode_refuses_overflow_and_foreign_digits() {
        assert_eq!(checked_seconds("12:34"), Some(754));
        assert_eq!(checked_seconds("100:00:00"), Some(360_000));
        assert_eq!(checked_seconds("99999999999999999999:00:00"), None);
        assert_eq!(checked_seconds("5124095576030432:00:00"), None);
        assert_eq!(checked_seconds("٢:15:30"), None);
        assert_eq!(checked_seconds("1:"), None);
        assert_eq!(checked_seconds("42"), None);
    }

    #[test]
    fn player_positions_are_floored() {
        assert_eq!(whole_seconds(12.9), 12);
        assert_eq!(whole_seconds(-1.0), 0);
        assert_eq!(whole_seconds(f64::NAN), 0);
        assert_eq!(format_position(65.7), "1:05");
    }
}
