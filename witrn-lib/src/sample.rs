use crate::measurement::Measurement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One decoded, time-stamped reading.
///
/// Serialises as `{"ts": "<RFC 3339>", "v": <volts>, "i": <amperes>}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(rename = "ts")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "v")]
    voltage: f32,
    #[serde(rename = "i")]
    current: f32,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, voltage: f32, current: f32) -> Self {
        Self {
            timestamp,
            voltage,
            current,
        }
    }

    pub(crate) fn from_measurement(timestamp: DateTime<Utc>, measurement: Measurement) -> Self {
        Self::new(timestamp, measurement.voltage, measurement.current)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Bus voltage in volts
    pub fn voltage(&self) -> f32 {
        self.voltage
    }

    /// Bus current in amperes
    pub fn current(&self) -> f32 {
        self.current
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} VBUS: {:.3} V, IBUS: {:.3} A",
            self.timestamp.to_rfc3339(),
            self.voltage,
            self.current
        )
    }
}
