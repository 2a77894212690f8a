pub mod clock;
pub mod constants;
pub mod decoder;
pub mod device;
pub mod error;
pub mod frame;
pub mod measurement;
pub mod sample;
pub mod stats;

pub use clock::ClockState;
pub use decoder::{SampleDecoder, SystemClock, WallClock, decode_next, decode_next_at};
pub use device::{DeviceConfig, WitrnMeter};
pub use error::{DecodeError, FrameError, WitrnError};
pub use frame::{RawFrame, WitrnFrameRaw};
pub use sample::Sample;
pub use stats::{SampleStats, Summary};
