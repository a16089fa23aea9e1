//! UTC timestamp formatting for form defaults and record metadata.

use crate::domain::{OlcumError, OlcumResult};
use std::time::{Duration, SystemTime};
use time::OffsetDateTime;
use time::macros::format_description;

pub fn unix_seconds(time: SystemTime) -> i64 {
    OffsetDateTime::from(time).unix_timestamp()
}

/// `YYYY-MM-DDTHH:MM`, the value format of a datetime-local input.
pub fn format_minutes(time: SystemTime) -> OlcumResult<String> {
    OffsetDateTime::from(time)
        .format(format_description!("[year]-[month]-[day]T[hour]:[minute]"))
        .map_err(format_error)
}

/// `YYYY-MM-DDTHH:MM:SS`.
pub fn format_seconds(time: SystemTime) -> OlcumResult<String> {
    OffsetDateTime::from(time)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
        .map_err(format_error)
}

/// Start now, end one hour later.
pub fn default_measurement_window(now: SystemTime) -> OlcumResult<(String, String)> {
    let end = now + Duration::from_secs(3600);
    Ok((format_minutes(now)?, format_minutes(end)?))
}

fn format_error(error: time::error::Format) -> OlcumError {
    OlcumError::internal("INTERNAL.TIME_FORMAT", error.to_string())
}
