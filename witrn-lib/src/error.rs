use nusb::transfer::TransferError;
use thiserror::Error;

/// Reasons a raw frame is rejected before any field is decoded.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("Invalid frame length: expected 64 bytes, got {actual}")]
    BadLength { actual: usize },

    #[error("Invalid frame signature: expected ff 55, got {:02x} {:02x}", .found[0], .found[1])]
    BadSignature { found: [u8; 2] },

    #[error("Payload checksum mismatch: computed {expected:#04x}, frame carries {actual:#04x}")]
    PayloadChecksumMismatch { expected: u8, actual: u8 },

    #[error("Header checksum mismatch: computed {expected:#04x}, frame carries {actual:#04x}")]
    HeaderChecksumMismatch { expected: u8, actual: u8 },
}

impl FrameError {
    /// True for checksum failures on an otherwise well-shaped frame.
    ///
    /// These are usually transient bus noise and the next read is likely fine.
    /// Length and signature failures instead point at a desynchronised stream
    /// or a device speaking a different protocol.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            FrameError::PayloadChecksumMismatch { .. } | FrameError::HeaderChecksumMismatch { .. }
        )
    }
}

/// Error returned by the sample decoder for a single frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Framing error: {0}")]
    Framing(#[from] FrameError),
}

/// The primary error type for the `witrn-lib` transport.
#[derive(Error, Debug)]
pub enum WitrnError {
    #[error("USB device not found. Is the WITRN meter connected?")]
    DeviceNotFound,

    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),

    #[error("USB transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Timeout during USB operation: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl From<FrameError> for WitrnError {
    fn from(err: FrameError) -> Self {
        WitrnError::Decode(DecodeError::Framing(err))
    }
}
