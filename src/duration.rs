//! # Duration Parsing
//!
//! Human-entered durations such as `10m`, `1h` or `2d`. Exactly one integer
//! followed by exactly one unit; anything else is refused rather than guessed.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false

use thiserror::Error;

pub const SECOND_MS: u64 = 1_000;
pub const MINUTE_MS: u64 = 60 * SECOND_MS;
pub const HOUR_MS: u64 = 60 * MINUTE_MS;
pub const DAY_MS: u64 = 24 * HOUR_MS;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,
    #[error("`{0}` is not a duration like 30s, 10m, 1h or 2d")]
    Malformed(String),
    #[error("`{0}` is too large")]
    Overflow(String),
}

/// Parses `<integer><unit>` with unit one of `s`, `m`, `h`, `d` into milliseconds.
/// Surrounding whitespace is ignored.
pub fn parse_duration(input: &str) -> Result<u64, DurationError> {
    let input = input.trim();
    let Some((unit_at, unit)) = input.char_indices().last() else {
        return Err(DurationError::Empty);
    };

    let digits = &input[..unit_at];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationError::Malformed(input.to_string()));
    }

    let scale = match unit {
        's' => SECOND_MS,
        'm' => MINUTE_MS,
        'h' => HOUR_MS,
        'd' => DAY_MS,
        _ => return Err(DurationError::Malformed(input.to_string())),
    };

    // Only digits remain, so parsing can only fail on overflow.
    let value: u64 = digits
        .parse()
        .map_err(|_| DurationError::Overflow(input.to_string()))?;

    value
        .checked_mul(scale)
        .ok_or_else(|| DurationError::Overflow(input.to_string()))
}

/// Formats milliseconds as the two coarsest non-zero units, e.g. `1h 30m`.
///
/// Zero units in between are skipped (`2d 30m`), and anything under a second
/// reads `0s`.
pub fn format_duration(ms: u64) -> String {
    let units = [
        (ms / DAY_MS, 'd'),
        ((ms % DAY_MS) / HOUR_MS, 'h'),
        ((ms % HOUR_MS) / MINUTE_MS, 'm'),
        ((ms % MINUTE_MS) / SECOND_MS, 's'),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(value, _)| *value > 0)
        .take(2)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();
    if parts.is_empty() {
        return "0s".to_string();
    }
    parts.join(" ")
}
