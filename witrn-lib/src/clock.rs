//! Reconstruction of absolute timestamps from the meter's coarse clock.
//!
//! The meter only reports an 8-bit seconds counter that wraps every 256 s, a
//! coarse millisecond byte that wraps modulo 256, and a separate byte holding
//! the true millisecond value modulo 100. From these the host rebuilds a
//! monotonic elapsed time and anchors it to the wall clock once per session.
//!
//! The seconds counter and the coarse millisecond byte are both read from
//! byte 3. Byte 2 looks like a dedicated seconds field but its meaning is
//! unconfirmed without device captures, so it is left alone.

use crate::constants::{SECONDS_PER_WRAP, WRAP_HIGH_WATERMARK, WRAP_LOW_WATERMARK};
use crate::frame::WitrnFrameRaw;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::trace;

/// Per-session clock reconstruction state.
///
/// One instance per open device. Never share it between sessions: the wrap
/// counter and the epoch only make sense for the stream they were built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockState {
    last_coarse_seconds: u8,
    wrap_count: u32,
    epoch: Option<DateTime<Utc>>,
}

impl ClockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coarse seconds value of the most recent frame.
    pub fn last_coarse_seconds(&self) -> u8 {
        self.last_coarse_seconds
    }

    /// How many times the seconds counter has rolled over.
    pub fn wrap_count(&self) -> u32 {
        self.wrap_count
    }

    /// Wall-clock moment corresponding to device time zero, fixed by the
    /// first reconstructed frame.
    pub fn epoch(&self) -> Option<DateTime<Utc>> {
        self.epoch
    }
}

/// Raw clock fields of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFields {
    pub coarse_seconds: u8,
    pub coarse_ms: u8,
    pub ms_mod100: u8,
}

impl ClockFields {
    pub fn from_frame(frame: &WitrnFrameRaw) -> Self {
        Self {
            coarse_seconds: frame.timestamp_ms,
            coarse_ms: frame.timestamp_ms,
            ms_mod100: frame.timestamp_ms_mod100,
        }
    }
}

/// Recover the sub-second milliseconds (0..1000) from the coarse byte.
///
/// The coarse byte is the true value modulo 256, so the true value is one of
/// `coarse + 256 * j` for `j` in `0..=3`. The first candidate agreeing with
/// the modulo-100 byte wins. Returns `None` if none of them does.
pub fn resolve_subsecond_ms(coarse_ms: u8, ms_mod100: u8) -> Option<u16> {
    (0..=3u16)
        .map(|j| (256 * j + u16::from(coarse_ms)) % 1000)
        .find(|candidate| candidate % 100 == u16::from(ms_mod100))
}

/// Milliseconds since device time zero, advancing the wrap counter if the
/// seconds field rolled over since the previous frame.
fn elapsed_ms(state: &mut ClockState, fields: ClockFields) -> i64 {
    if fields.coarse_seconds < WRAP_LOW_WATERMARK && state.last_coarse_seconds > WRAP_HIGH_WATERMARK {
        state.wrap_count += 1;
        trace!(
            from = state.last_coarse_seconds,
            to = fields.coarse_seconds,
            wrap_count = state.wrap_count,
            "Coarse seconds counter wrapped"
        );
    }
    state.last_coarse_seconds = fields.coarse_seconds;

    let base_ms = resolve_subsecond_ms(fields.coarse_ms, fields.ms_mod100).unwrap_or_else(|| {
        trace!(
            coarse_ms = fields.coarse_ms,
            ms_mod100 = fields.ms_mod100,
            "No sub-second candidate matched, using 0 ms"
        );
        0
    });

    let seconds = i64::from(fields.coarse_seconds) + i64::from(state.wrap_count) * SECONDS_PER_WRAP;
    seconds * 1000 + i64::from(base_ms)
}

/// Turn the clock fields of a validated frame into an absolute timestamp.
///
/// `now` is only consulted on the first call for a session, to anchor the
/// epoch. Frames must be passed in arrival order. This never fails: when the
/// sub-second value cannot be recovered the timestamp falls back to the whole
/// second.
pub fn reconstruct(state: &mut ClockState, frame: &WitrnFrameRaw, now: DateTime<Utc>) -> DateTime<Utc> {
    let elapsed = TimeDelta::milliseconds(elapsed_ms(state, ClockFields::from_frame(frame)));
    let epoch = *state.epoch.get_or_insert(now - elapsed);
    epoch + elapsed
}
