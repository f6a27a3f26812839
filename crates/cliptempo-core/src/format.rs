//! Sample rate and channel layout shared by every stage of a chain.

use std::fmt;

use crate::{Error, Result};

/// Sample rate and interleaved channel count of a frame stream.
///
/// Two formats are compatible only when both fields are equal; no stage
/// resamples or remixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioFormat {
    sample_rate: u32,
    channels: u16,
}

impl AudioFormat {
    /// Create a format, rejecting a zero sample rate or channel count.
    pub fn new(sample_rate: u32, channels: u16) -> Result<Self> {
        if sample_rate == 0 || channels == 0 {
            return Err(Error::InvalidFormat {
                sample_rate,
                channels,
            });
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Single channel at the given rate.
    pub const fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate: if sample_rate == 0 { 1 } else { sample_rate },
            channels: 1,
        }
    }

    /// Two interleaved channels at the given rate.
    pub const fn stereo(sample_rate: u32) -> Self {
        Self {
            sample_rate: if sample_rate == 0 { 1 } else { sample_rate },
            channels: 2,
        }
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels as usize
    }

    #[inline]
    pub fn is_compatible(&self, other: &AudioFormat) -> bool {
        self == other
    }

    /// Number of whole frames contained in `samples` interleaved samples.
    #[inline]
    pub fn frames_in(&self, samples: usize) -> usize {
        samples / self.channels()
    }

    /// Number of interleaved samples making up `frames` frames.
    #[inline]
    pub fn samples_in(&self, frames: usize) -> usize {
        frames * self.channels()
    }

    /// Round a sample count down to the nearest whole frame.
    #[inline]
    pub fn whole_frames(&self, samples: usize) -> usize {
        samples - samples % self.channels()
    }

    /// Number of frames spanning `ms` milliseconds (rounded to nearest).
    pub fn frames_for_ms(&self, ms: f32) -> usize {
        ((self.sample_rate as f32 * ms / 1000.0).round() as usize).max(1)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz / {} ch", self.sample_rate, self.channels)
    }
}
