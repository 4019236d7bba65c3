//! `Duration` as fractional seconds, for `#[serde(with = "seconds")]`.
//!
//! Values are rounded to whole microseconds so `0.6` reads back as exactly
//! 600ms.

use std::time::Duration;

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

pub(crate) fn serialize<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(D::Error::custom(format!(
            "duration must be a non-negative number of seconds, got {secs}"
        )));
    }
    let micros = (secs * 1e6).round() as u64;
    Ok(Duration::from_micros(micros))
}
