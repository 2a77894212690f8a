//! End-to-end tests for turning raw frames into samples

mod common;

use common::*;
use std::cell::Cell;
use witrn_lib::{Sample, SampleDecoder, WallClock, decode_next, decode_next_at};

/// Wall clock that advances by a fixed step on every reading.
struct SteppingClock {
    next: Cell<DateTime<Utc>>,
    step: TimeDelta,
}

impl SteppingClock {
    fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

impl WallClock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

#[test]
fn test_decode_sample_frame() {
    let now = fixed_now();
    let mut state = ClockState::new();
    let sample = decode_next_at(&hex_to_frame(SAMPLE_FRAME), &mut state, now).unwrap();

    assert_eq!(sample.voltage(), 5.0625);
    assert_eq!(sample.current(), 1.25);
    assert_eq!(sample.timestamp(), now);
}

#[test]
fn test_three_consecutive_frames() {
    let now = fixed_now();
    let mut state = ClockState::new();
    let samples: Vec<Sample> = [5u8, 6, 7]
        .into_iter()
        .map(|s| {
            let frame = FrameBuilder::new().seconds(s).voltage(5.0).current(0.5).build();
            decode_next_at(&frame, &mut state, now).unwrap()
        })
        .collect();

    for pair in samples.windows(2) {
        let gap = pair[1].timestamp() - pair[0].timestamp();
        assert!(gap > TimeDelta::zero());
        // Coarse ms tracks the seconds byte, so each step is 1 s + 1 ms
        assert!((gap - TimeDelta::seconds(1)).abs() < TimeDelta::milliseconds(100), "gap {:?}", gap);
    }
    assert_eq!(state.wrap_count(), 0);
    assert_eq!(state.last_coarse_seconds(), 7);
}

#[test]
fn test_rejected_frame_leaves_state_untouched() {
    let now = fixed_now();
    let mut state = ClockState::new();
    decode_next_at(&FrameBuilder::new().seconds(253).build(), &mut state, now).unwrap();
    let before = state.clone();

    let mut corrupt = FrameBuilder::new().seconds(3).build();
    corrupt[20] ^= 0x01;
    let err = decode_next_at(&corrupt, &mut state, now).unwrap_err();

    assert!(matches!(
        err,
        DecodeError::Framing(FrameError::PayloadChecksumMismatch { .. })
    ));
    // The rejected frame would have counted as a wraparound
    assert_eq!(state, before);
}

#[test]
fn test_rejected_first_frame_does_not_anchor_epoch() {
    let mut state = ClockState::new();
    let err = decode_next(&[0xff, 0x55, 0x00], &mut state).unwrap_err();
    assert_eq!(err, DecodeError::Framing(FrameError::BadLength { actual: 3 }));
    assert_eq!(state.epoch(), None);
}

#[test]
fn test_same_frame_in_independent_sessions() {
    let now = fixed_now();
    let frame = FrameBuilder::new().seconds(120).voltage(9.01).current(2.99).build();

    let mut a = ClockState::new();
    let mut b = ClockState::new();
    let first = decode_next_at(&frame, &mut a, now).unwrap();
    let second = decode_next_at(&frame, &mut b, now).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.voltage().to_bits(), 9.01f32.to_bits());
    assert_eq!(first.current().to_bits(), 2.99f32.to_bits());
}

#[test]
fn test_session_reads_wall_clock_only_for_epoch() {
    let start = fixed_now();
    let mut decoder = SampleDecoder::with_clock(SteppingClock::new(start, TimeDelta::minutes(5)));

    let first = decoder.decode(&FrameBuilder::new().seconds(30).build()).unwrap();
    let second = decoder.decode(&FrameBuilder::new().seconds(31).build()).unwrap();

    assert_eq!(first.timestamp(), start);
    // The wall clock moved five minutes, device time moved 1.001 s
    assert_eq!(second.timestamp() - first.timestamp(), TimeDelta::milliseconds(1_001));
    assert_eq!(decoder.state().epoch(), Some(start - TimeDelta::milliseconds(30_030)));
}

#[test]
fn test_session_reset_starts_new_epoch() {
    let start = fixed_now();
    let mut decoder = SampleDecoder::with_clock(SteppingClock::new(start, TimeDelta::minutes(5)));
    decoder.decode(&FrameBuilder::new().seconds(252).build()).unwrap();
    decoder.decode(&FrameBuilder::new().seconds(1).build()).unwrap();
    assert_eq!(decoder.state().wrap_count(), 1);

    decoder.reset();
    assert_eq!(decoder.state(), &ClockState::new());

    let sample = decoder.decode(&FrameBuilder::new().seconds(1).build()).unwrap();
    assert_eq!(decoder.state().wrap_count(), 0);
    assert!(sample.timestamp() > start);
}

#[test]
fn test_system_clock_session() {
    let before = Utc::now();
    let mut decoder = SampleDecoder::new();
    let sample = decoder.decode(&hex_to_frame(SAMPLE_FRAME)).unwrap();
    let after = Utc::now();

    assert!(sample.timestamp() >= before && sample.timestamp() <= after);
}

#[test]
fn test_sample_json_shape() {
    let sample = Sample::new(fixed_now(), 5.0, 0.25);
    let json = serde_json::to_value(sample).unwrap();

    assert_eq!(json["ts"], "2026-03-14T15:09:26Z");
    assert_eq!(json["v"], 5.0);
    assert_eq!(json["i"], 0.25);
    assert_eq!(json.as_object().unwrap().len(), 3);

    let back: Sample = serde_json::from_value(json).unwrap();
    assert_eq!(back, sample);
}

#[test]
fn test_decode_error_display() {
    let err = DecodeError::Framing(FrameError::BadSignature { found: [0x12, 0x34] });
    assert_eq!(
        err.to_string(),
        "Framing error: Invalid frame signature: expected ff 55, got 12 34"
    );
}

#[test]
fn test_sample_display() {
    let sample = Sample::new(fixed_now(), 5.0, 0.25);
    assert_eq!(
        sample.to_string(),
        "2026-03-14T15:09:26+00:00 VBUS: 5.000 V, IBUS: 0.250 A"
    );
}
