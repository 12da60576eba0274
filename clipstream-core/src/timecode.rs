//! Time normalization for clip boundaries.
//!
//! Callers supply times as raw seconds, `"M:SS"`, or `"H:MM:SS"`; everything
//! is normalized here to canonical non-negative integer seconds. Unparseable
//! input is always an error - coercing bad input to zero hides client bugs
//! behind zero-length or mispositioned clips.

use serde::Deserialize;

/// Errors from time parsing and range validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimecodeError {
    #[error("unparseable time value: {input:?}")]
    Unparseable { input: String },

    #[error("invalid time range: end {end} must be greater than start {start}")]
    InvalidRange { start: u64, end: u64 },
}

/// A time value as it arrives at an API boundary: either a bare number of
/// seconds or a timestamp string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimeSpec {
    Seconds(f64),
    Text(String),
}

impl TimeSpec {
    /// Normalizes to whole seconds, clamped to zero.
    pub fn to_seconds(&self) -> Result<u64, TimecodeError> {
        match self {
            TimeSpec::Seconds(value) => Ok(clamp_seconds(*value)),
            TimeSpec::Text(text) => normalize(text),
        }
    }
}

/// A validated clip time range in whole seconds.
///
/// Invariant: `end_seconds > start_seconds`, so the duration is at least one
/// second by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_seconds: u64,
    pub end_seconds: u64,
}

impl TimeRange {
    pub fn duration_seconds(&self) -> u64 {
        self.end_seconds - self.start_seconds
    }
}

/// Truncates toward zero and clamps negatives to zero.
fn clamp_seconds(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}

/// Normalizes a time string to whole seconds.
///
/// Accepts `"H:MM:SS"`, `"M:SS"`, or a plain numeric string. Negative numeric
/// values clamp to zero.
///
/// # Errors
///
/// - `TimecodeError::Unparseable` - value is neither a timestamp nor a number
pub fn normalize(input: &str) -> Result<u64, TimecodeError> {
    let trimmed = input.trim();

    if trimmed.contains(':') {
        let parts: Vec<&str> = trimmed.split(':').collect();
        let unparseable = || TimecodeError::Unparseable {
            input: input.to_string(),
        };

        let fields: Vec<u64> = parts
            .iter()
            .map(|part| part.parse::<u64>())
            .collect::<Result<_, _>>()
            .map_err(|_| unparseable())?;

        return match fields.as_slice() {
            [hours, minutes, seconds] => Ok(hours * 3600 + minutes * 60 + seconds),
            [minutes, seconds] => Ok(minutes * 60 + seconds),
            _ => Err(unparseable()),
        };
    }

    let value = trimmed
        .parse::<f64>()
        .map_err(|_| TimecodeError::Unparseable {
            input: input.to_string(),
        })?;

    // Rust's f64 parser accepts "inf" and "nan"; those are never a time.
    if !value.is_finite() {
        return Err(TimecodeError::Unparseable {
            input: input.to_string(),
        });
    }

    Ok(clamp_seconds(value))
}

/// Normalizes a start/end pair and enforces `end > start`.
///
/// # Errors
///
/// - `TimecodeError::Unparseable` - either value fails to normalize
/// - `TimecodeError::InvalidRange` - normalized end is not after start
pub fn normalize_range(start: &TimeSpec, end: &TimeSpec) -> Result<TimeRange, TimecodeError> {
    let start_seconds = start.to_seconds()?;
    let end_seconds = end.to_seconds()?;

    if end_seconds <= start_seconds {
        return Err(TimecodeError::InvalidRange {
            start: start_seconds,
            end: end_seconds,
        });
    }

    Ok(TimeRange {
        start_seconds,
        end_seconds,
    })
}

/// Formats whole seconds as `H:MM:SS`.
pub fn format_timestamp(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hms() {
        assert_eq!(normalize("01:02:03").unwrap(), 3723);
        assert_eq!(normalize("0:00:00").unwrap(), 0);
        assert_eq!(normalize("2:05").unwrap(), 125);
    }

    #[test]
    fn test_normalize_numeric_strings() {
        assert_eq!(normalize("42").unwrap(), 42);
        assert_eq!(normalize("42.9").unwrap(), 42);
        assert_eq!(normalize("-7").unwrap(), 0);
        assert_eq!(normalize(" 15 ").unwrap(), 15);
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        for input in ["abc", "1:2:3:4", "1:xx", "", ":", "1::2"] {
            assert!(
                matches!(normalize(input), Err(TimecodeError::Unparseable { .. })),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_normalize_rejects_non_finite_strings() {
        for input in ["inf", "-inf", "infinity", "nan", "NaN", "+inf"] {
            assert!(
                matches!(normalize(input), Err(TimecodeError::Unparseable { .. })),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_time_spec_clamps_negative_numbers() {
        assert_eq!(TimeSpec::Seconds(-7.0).to_seconds().unwrap(), 0);
        assert_eq!(TimeSpec::Seconds(10.9).to_seconds().unwrap(), 10);
        assert_eq!(TimeSpec::Seconds(f64::NAN).to_seconds().unwrap(), 0);
    }

    #[test]
    fn test_normalize_range() {
        let range = normalize_range(&TimeSpec::Seconds(10.0), &TimeSpec::Seconds(15.0)).unwrap();
        assert_eq!(range.duration_seconds(), 5);

        let err = normalize_range(&TimeSpec::Seconds(15.0), &TimeSpec::Seconds(10.0)).unwrap_err();
        assert_eq!(err, TimecodeError::InvalidRange { start: 15, end: 10 });

        let err = normalize_range(&TimeSpec::Seconds(10.0), &TimeSpec::Seconds(10.0)).unwrap_err();
        assert!(matches!(err, TimecodeError::InvalidRange { .. }));
    }

    #[test]
    fn test_normalize_range_mixed_representations() {
        let range = normalize_range(
            &TimeSpec::Text("1:00".to_string()),
            &TimeSpec::Text("0:02:30".to_string()),
        )
        .unwrap();
        assert_eq!(range.start_seconds, 60);
        assert_eq!(range.end_seconds, 150);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "0:00:00");
        assert_eq!(format_timestamp(3723), "1:02:03");
        assert_eq!(format_timestamp(59), "0:00:59");
        assert_eq!(format_timestamp(7265), "2:01:05");
    }
}
