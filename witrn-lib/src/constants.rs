// Protocol constants for WITRN meters

/// USB vendor ID shared by WITRN meters (any product ID is accepted)
pub const WITRN_VID: u16 = 0x0716;

/// HID interrupt IN endpoint the meter streams frames on
pub const ENDPOINT_IN: u8 = 0x81;

/// Every report is exactly one 64-byte frame
pub const FRAME_LEN: usize = 64;

/// Fixed marker in bytes 0..2 of every frame
pub const FRAME_SIGNATURE: [u8; 2] = [0xFF, 0x55];

/// Header checksum covers bytes 0..8
pub const HEADER_END: usize = 8;

/// Byte holding the coarse clock (seconds and coarse milliseconds)
pub const OFFSET_TIMESTAMP_MS: usize = 3;

/// Byte holding true milliseconds mod 100
pub const OFFSET_TIMESTAMP_MS_MOD100: usize = 6;

/// Bus voltage, f32 LE
pub const OFFSET_VOLTAGE: usize = 46;

/// Bus current, f32 LE
pub const OFFSET_CURRENT: usize = 50;

/// Payload checksum covers bytes 8..62
pub const OFFSET_PAYLOAD_CHECKSUM: usize = 62;

pub const OFFSET_HEADER_CHECKSUM: usize = 63;

/// The coarse seconds counter is 8 bits wide
pub const SECONDS_PER_WRAP: i64 = 256;

/// Wraparound is assumed when the counter drops from above this value...
pub const WRAP_HIGH_WATERMARK: u8 = 250;

/// ...to below this one
pub const WRAP_LOW_WATERMARK: u8 = 10;
