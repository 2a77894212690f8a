use crate::clock::{self, ClockState};
use crate::error::DecodeError;
use crate::frame::WitrnFrameRaw;
use crate::measurement;
use crate::sample::Sample;
use chrono::{DateTime, Utc};

/// Source of wall-clock time for epoch anchoring.
pub trait WallClock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Decode one raw frame into a [`Sample`], using the system clock to anchor
/// the session epoch on the first frame.
pub fn decode_next(raw: &[u8], state: &mut ClockState) -> Result<Sample, DecodeError> {
    decode_next_at(raw, state, Utc::now())
}

/// Same as [`decode_next`] with an explicit wall-clock reading.
///
/// A rejected frame leaves `state` untouched.
pub fn decode_next_at(raw: &[u8], state: &mut ClockState, now: DateTime<Utc>) -> Result<Sample, DecodeError> {
    let frame = WitrnFrameRaw::parse(raw)?;
    let measurement = measurement::decode(frame);
    let timestamp = clock::reconstruct(state, frame, now);
    Ok(Sample::from_measurement(timestamp, measurement))
}

/// A decoding session: owns the clock state for one device stream.
#[derive(Debug, Default)]
pub struct SampleDecoder<C: WallClock = SystemClock> {
    state: ClockState,
    clock: C,
}

impl SampleDecoder<SystemClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: WallClock> SampleDecoder<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: ClockState::new(),
            clock,
        }
    }

    /// Decode the next frame of this session.
    pub fn decode(&mut self, raw: &[u8]) -> Result<Sample, DecodeError> {
        decode_next_at(raw, &mut self.state, self.clock.now())
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    /// Forget the epoch and wrap count, e.g. after the device was reconnected.
    pub fn reset(&mut self) {
        self.state = ClockState::new();
    }
}
