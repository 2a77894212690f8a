//! Common test utilities and shared imports

// Shared across test files; not every item is used by each of them
#[allow(unused_imports)]
pub use chrono::{DateTime, TimeDelta, TimeZone, Utc};
#[allow(unused_imports)]
pub use witrn_lib::clock::ClockState;
#[allow(unused_imports)]
pub use witrn_lib::error::{DecodeError, FrameError};
#[allow(unused_imports)]
pub use witrn_lib::frame::{self, RawFrame, WitrnFrameRaw};

/// Captured-style frame: coarse clock 0xff, ms mod 100 = 11, 5.0625 V, 1.25 A,
/// 0.125 Ah and 0.625 Wh in the accumulator fields.
#[allow(dead_code)]
pub const SAMPLE_FRAME: &str = "ff5511ff01000b000000000000000000003e0000203f0000000000000000000000000000000000000000000000000000a2400000a03f00000000000000005ece";

/// Decode a hex string into a frame
#[allow(dead_code)]
pub fn hex_to_frame(hex_data: &str) -> RawFrame {
    hex::decode(hex_data)
        .expect("Failed to decode hex")
        .try_into()
        .expect("Fixture is not 64 bytes")
}

/// A fixed wall-clock moment so epoch anchoring is reproducible
#[allow(dead_code)]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap()
}

/// Builds frames with a valid signature; `build` fills in the checksums.
#[allow(dead_code)]
pub struct FrameBuilder {
    bytes: RawFrame,
}

#[allow(dead_code)]
impl FrameBuilder {
    pub fn new() -> Self {
        let mut bytes = [0u8; 64];
        bytes[0] = 0xff;
        bytes[1] = 0x55;
        Self { bytes }
    }

    /// Set the coarse clock byte and the ms-mod-100 byte explicitly.
    pub fn clock(mut self, coarse: u8, ms_mod100: u8) -> Self {
        self.bytes[3] = coarse;
        self.bytes[6] = ms_mod100;
        self
    }

    /// Coarse clock with a sub-second byte that resolves on the first candidate.
    pub fn seconds(self, coarse: u8) -> Self {
        self.clock(coarse, coarse % 100)
    }

    pub fn voltage(mut self, volts: f32) -> Self {
        self.bytes[46..50].copy_from_slice(&volts.to_le_bytes());
        self
    }

    pub fn current(mut self, amps: f32) -> Self {
        self.bytes[50..54].copy_from_slice(&amps.to_le_bytes());
        self
    }

    pub fn byte(mut self, offset: usize, value: u8) -> Self {
        self.bytes[offset] = value;
        self
    }

    pub fn build(mut self) -> RawFrame {
        frame::seal(&mut self.bytes);
        self.bytes
    }

    pub fn build_unsealed(self) -> RawFrame {
        self.bytes
    }
}
