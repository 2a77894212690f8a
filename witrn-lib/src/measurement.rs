use crate::frame::WitrnFrameRaw;
use std::fmt;

/// Bus voltage and current exactly as the meter reports them.
///
/// Values are passed through bit-for-bit, NaN and infinities included.
/// Plausibility checks are up to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub voltage: f32, // Volts
    pub current: f32, // Amperes
}

/// Read the voltage and current fields of a validated frame.
pub fn decode(frame: &WitrnFrameRaw) -> Measurement {
    Measurement {
        voltage: frame.voltage.get(),
        current: frame.current.get(),
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VBUS: {:.3} V, IBUS: {:.3} A", self.voltage, self.current)
    }
}
