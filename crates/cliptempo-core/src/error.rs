//! Error types for cliptempo.

use crate::format::AudioFormat;
use thiserror::Error;

/// Error type for pipeline construction and clip loading.
///
/// Runtime conditions (end-of-stream, transient starvation, drain caps) are
/// never reported through this type; they surface as a short or zero `read`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid audio format: sample_rate={sample_rate}, channels={channels}")]
    InvalidFormat { sample_rate: u32, channels: u16 },

    #[error("Invalid tempo: {0}. Must be finite and greater than zero")]
    InvalidTempo(f32),

    #[error("Concatenation needs at least one source")]
    NoSources,

    #[error("Source {index} has format {found}, expected {expected}")]
    FormatMismatch {
        index: usize,
        expected: AudioFormat,
        found: AudioFormat,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
