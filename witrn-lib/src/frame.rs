//! Frame layout and integrity checks.
//!
//! Every HID report from the meter is a single 64-byte frame:
//!
//! ```text
//! 0        2   3   4      6   7        14                       46      50      54      62  63
//! ┌────────┬───┬───┬──────┬───┬────────┬────────────────────────┬───────┬───────┬───────┬───┬───┐
//! │ ff 55  │ s │ms │ ???  │m% │  ???   │ Ah Wh rec time D+ D- … │ V f32 │ A f32 │  ???  │ P │ H │
//! └────────┴───┴───┴──────┴───┴────────┴────────────────────────┴───────┴───────┴───────┴───┴───┘
//! ```
//!
//! `P` is the sum of bytes 8..62 and `H` is the sum of bytes 0..8 plus `P`,
//! both modulo 256.

use crate::constants::{
    FRAME_LEN, FRAME_SIGNATURE, HEADER_END, OFFSET_CURRENT, OFFSET_HEADER_CHECKSUM, OFFSET_PAYLOAD_CHECKSUM,
    OFFSET_TIMESTAMP_MS, OFFSET_TIMESTAMP_MS_MOD100, OFFSET_VOLTAGE,
};
use crate::error::FrameError;
use std::mem::offset_of;
use zerocopy::byteorder::little_endian::F32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// One frame exactly as the transport delivers it.
pub type RawFrame = [u8; FRAME_LEN];

/// Borrowed view of a frame. Only the clock and measurement fields are ever
/// interpreted; the rest are kept as opaque bytes so they still take part in
/// the checksums.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct WitrnFrameRaw {
    pub signature: [u8; 2],
    /// Distinct seconds byte; not used by the clock (byte 3 is read instead)
    pub timestamp_s: u8,
    pub timestamp_ms: u8,
    pub unknown1: [u8; 2],
    pub timestamp_ms_mod100: u8,
    pub unknown2: [u8; 7],
    pub charge_ah: [u8; 4],    // Accumulated charge
    pub energy_wh: [u8; 4],    // Accumulated energy
    pub record_time: [u8; 4],  // Record time
    pub elapsed_time: [u8; 4], // Elapsed time
    pub d_plus: [u8; 4],       // D+ line voltage
    pub d_minus: [u8; 4],      // D- line voltage
    pub unknown3: [u8; 8],
    pub voltage: F32, // Volts
    pub current: F32, // Amperes
    pub unknown4: [u8; 8],
    pub payload_checksum: u8,
    pub header_checksum: u8,
}

const _: () = {
    assert!(size_of::<WitrnFrameRaw>() == FRAME_LEN);
    assert!(offset_of!(WitrnFrameRaw, timestamp_ms) == OFFSET_TIMESTAMP_MS);
    assert!(offset_of!(WitrnFrameRaw, timestamp_ms_mod100) == OFFSET_TIMESTAMP_MS_MOD100);
    assert!(offset_of!(WitrnFrameRaw, voltage) == OFFSET_VOLTAGE);
    assert!(offset_of!(WitrnFrameRaw, current) == OFFSET_CURRENT);
    assert!(offset_of!(WitrnFrameRaw, payload_checksum) == OFFSET_PAYLOAD_CHECKSUM);
    assert!(offset_of!(WitrnFrameRaw, header_checksum) == OFFSET_HEADER_CHECKSUM);
};

impl WitrnFrameRaw {
    /// Validate `bytes` and borrow them as a frame.
    pub fn parse(bytes: &[u8]) -> Result<&Self, FrameError> {
        validate(bytes)?;
        Self::ref_from_bytes(bytes).map_err(|_| FrameError::BadLength { actual: bytes.len() })
    }
}

/// Checksum bytes as they should appear at offsets 62 and 63.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksums {
    /// Sum of bytes 0..8 plus `payload`
    pub header: u8,
    /// Sum of bytes 8..62
    pub payload: u8,
}

fn sum_bytes(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

fn compute(frame: &[u8]) -> Checksums {
    let payload = sum_bytes(&frame[HEADER_END..OFFSET_PAYLOAD_CHECKSUM]);
    let header = sum_bytes(&frame[..HEADER_END]).wrapping_add(payload);
    Checksums { header, payload }
}

/// Compute both checksum bytes for a frame. Bytes 62 and 63 are ignored.
pub fn checksums(frame: &RawFrame) -> Checksums {
    compute(frame)
}

/// Write the checksum bytes into a frame so that it passes [`validate`].
pub fn seal(frame: &mut RawFrame) {
    let sums = compute(frame);
    frame[OFFSET_PAYLOAD_CHECKSUM] = sums.payload;
    frame[OFFSET_HEADER_CHECKSUM] = sums.header;
}

/// Check that `frame` is a well-formed, uncorrupted frame.
///
/// The payload checksum is checked first: a corrupted payload byte breaks
/// both sums, and reporting the payload failure is the more precise answer.
pub fn validate(frame: &[u8]) -> Result<(), FrameError> {
    if frame.len() != FRAME_LEN {
        return Err(FrameError::BadLength { actual: frame.len() });
    }
    if frame[..2] != FRAME_SIGNATURE {
        return Err(FrameError::BadSignature {
            found: [frame[0], frame[1]],
        });
    }

    let sums = compute(frame);
    if sums.payload != frame[OFFSET_PAYLOAD_CHECKSUM] {
        return Err(FrameError::PayloadChecksumMismatch {
            expected: sums.payload,
            actual: frame[OFFSET_PAYLOAD_CHECKSUM],
        });
    }
    if sums.header != frame[OFFSET_HEADER_CHECKSUM] {
        return Err(FrameError::HeaderChecksumMismatch {
            expected: sums.header,
            actual: frame[OFFSET_HEADER_CHECKSUM],
        });
    }
    Ok(())
}
