//! Value codecs for timestamp, duration and text properties.

pub mod duration;
pub mod text;
pub mod timestamp;
pub mod uid;

pub use duration::DurationParts;
pub use timestamp::{Timestamp, TzMap};

/// Error type for value decoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    #[error("invalid UTC offset: {0}")]
    InvalidOffset(String),
    #[error("duration out of range")]
    DurationOverflow,
}
