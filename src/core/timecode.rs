//! core/timecode.rs
//! Time strings <-> `Duration`.
//!
//! Accepted input shapes:
//! - "90.5"         -> plain decimal seconds
//! - "1:30.500"     -> minutes:seconds
//! - "0:01:30.500"  -> hours:minutes:seconds
//!
//! Each colon-separated part is itself a decimal number.

use std::time::Duration;

use super::error::{Error, Result};

/// Parse a (trimmed) time string into a duration.
pub fn parse_time(s: &str) -> Result<Duration> {
    if let Ok(seconds) = s.parse::<f64>() {
        return seconds_to_duration(seconds, s);
    }

    if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        let seconds = match parts.as_slice() {
            [m, sec] => part(m, "minutes", s)? * 60.0 + part(sec, "seconds", s)?,
            [h, m, sec] => {
                part(h, "hours", s)? * 3600.0
                    + part(m, "minutes", s)? * 60.0
                    + part(sec, "seconds", s)?
            }
            _ => return Err(unsupported(s)),
        };
        return seconds_to_duration(seconds, s);
    }

    Err(unsupported(s))
}

/// Format as `H:MM:SS.mmm` when there is at least one hour, else `M:SS.mmm`.
///
/// All units are truncated, never rounded.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let seconds = total % 60;
    let millis = d.subsec_millis();

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
    } else {
        format!("{minutes}:{seconds:02}.{millis:03}")
    }
}

/// One colon-separated component. Must be a non-negative number.
fn part(p: &str, unit: &str, whole: &str) -> Result<f64> {
    let value = p
        .parse::<f64>()
        .map_err(|e| Error::Format(format!("Invalid {unit} in time '{whole}': {e}")))?;
    if value.is_sign_negative() {
        return Err(Error::Format(format!("Negative {unit} in time '{whole}'")));
    }
    Ok(value)
}

fn seconds_to_duration(seconds: f64, whole: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| Error::Format(format!("Time out of range: {whole}")))
}

fn unsupported(s: &str) -> Error {
    Error::Format(format!("Unsupported time format: {s}"))
}
