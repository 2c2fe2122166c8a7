use std::fmt;

use crate::error::{ClipError, ClipResult, Endpoint, TimeParseError};

/// A wall-clock style timestamp parsed from `[HH:]MM:SS[.fraction]`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSpec {
    /// Hours component (0-23); 0 when omitted
    pub hours: u32,
    /// Minutes component (0-59)
    pub minutes: u32,
    /// Seconds component, fractional part allowed (0-59.999...)
    pub seconds: f64,
}

impl TimeSpec {
    /// Parse a timestamp string
    ///
    /// Two `:`-separated segments are read as `MM:SS[.f]`, three as
    /// `HH:MM:SS[.f]`. Any other segment count is a format error; fields that
    /// parse but fall outside their range are range errors.
    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        let parts: Vec<&str> = input.split(':').collect();

        let (hours, minutes, seconds) = match parts.len() {
            2 => (
                0,
                parse_whole_field(parts[0], input)?,
                parse_seconds_field(parts[1], input)?,
            ),
            3 => (
                parse_whole_field(parts[0], input)?,
                parse_whole_field(parts[1], input)?,
                parse_seconds_field(parts[2], input)?,
            ),
            _ => {
                return Err(TimeParseError::Format {
                    input: input.to_string(),
                })
            }
        };

        if hours > 23 {
            return Err(TimeParseError::Range {
                field: "hours",
                input: input.to_string(),
            });
        }
        if minutes > 59 {
            return Err(TimeParseError::Range {
                field: "minutes",
                input: input.to_string(),
            });
        }
        if seconds >= 60.0 {
            return Err(TimeParseError::Range {
                field: "seconds",
                input: input.to_string(),
            });
        }

        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// Total offset from the start of the video, in seconds
    pub fn total_seconds(&self) -> f64 {
        self.hours as f64 * 3600.0 + self.minutes as f64 * 60.0 + self.seconds
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = if self.seconds.fract() == 0.0 {
            format!("{:02}", self.seconds as u32)
        } else {
            format!("{:06.3}", self.seconds)
        };
        if self.hours > 0 {
            write!(f, "{:02}:{:02}:{}", self.hours, self.minutes, seconds)
        } else {
            write!(f, "{:02}:{}", self.minutes, seconds)
        }
    }
}

/// A parse of an `HH`/`MM` field; any non-digit content is a format error
fn parse_whole_field(field: &str, input: &str) -> Result<u32, TimeParseError> {
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
        return Err(TimeParseError::Format {
            input: input.to_string(),
        });
    }
    field.parse().map_err(|_| TimeParseError::Format {
        input: input.to_string(),
    })
}

/// A parse of the `SS[.fraction]` field
fn parse_seconds_field(field: &str, input: &str) -> Result<f64, TimeParseError> {
    let format_err = || TimeParseError::Format {
        input: input.to_string(),
    };

    let (whole, fraction) = match field.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (field, None),
    };
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(format_err());
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(format_err());
        }
    }

    field.parse().map_err(|_| format_err())
}

/// The `[start, end)` window to extract from the source video
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRange {
    pub start: TimeSpec,
    pub end: TimeSpec,
}

impl ClipRange {
    /// Length of the clip in seconds
    pub fn duration(&self) -> f64 {
        self.end.total_seconds() - self.start.total_seconds()
    }
}

/// Validate a start/end pair against the source video's duration
///
/// Parse failures name the endpoint they occurred in. Once both endpoints
/// parse, the range must be non-empty and both endpoints must lie within
/// `[0, source_duration]`. Pure function; no side effects.
pub fn validate(start: &str, end: &str, source_duration: f64) -> ClipResult<ClipRange> {
    let start = TimeSpec::parse(start).map_err(|source| ClipError::InvalidTime {
        endpoint: Endpoint::Start,
        source,
    })?;
    let end = TimeSpec::parse(end).map_err(|source| ClipError::InvalidTime {
        endpoint: Endpoint::End,
        source,
    })?;

    let range = ClipRange { start, end };

    if range.duration() <= 0.0 {
        return Err(ClipError::EmptyRange);
    }
    if range.start.total_seconds() > source_duration {
        return Err(ClipError::PastEndOfVideo {
            endpoint: Endpoint::Start,
            time: range.start.to_string(),
        });
    }
    if range.end.total_seconds() > source_duration {
        return Err(ClipError::PastEndOfVideo {
            endpoint: Endpoint::End,
            time: range.end.to_string(),
        });
    }

    Ok(range)
}
