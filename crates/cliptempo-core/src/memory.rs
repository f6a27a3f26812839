//! In-memory clip playback.

use std::sync::Arc;

use crate::format::AudioFormat;
use crate::source::FrameSource;

/// Finite source over a decoded clip held in memory.
///
/// The sample data is shared, so the same clip can back several independent
/// sources (each with its own cursor) without copying.
#[derive(Debug, Clone)]
pub struct MemorySource {
    samples: Arc<[f32]>,
    format: AudioFormat,
    position: usize,
}

impl MemorySource {
    /// Create from interleaved samples. A trailing partial frame is ignored.
    pub fn new(samples: impl Into<Arc<[f32]>>, format: AudioFormat) -> Self {
        Self {
            samples: samples.into(),
            format,
            position: 0,
        }
    }

    /// A clip of `frames` frames of silence.
    pub fn silence(format: AudioFormat, frames: usize) -> Self {
        Self::new(vec![0.0; format.samples_in(frames)], format)
    }

    /// Total clip length in frames.
    pub fn len_frames(&self) -> usize {
        self.format.frames_in(self.samples.len())
    }

    /// Frames not yet read.
    pub fn remaining_frames(&self) -> usize {
        self.len_frames() - self.format.frames_in(self.position)
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_frames() == 0
    }

    /// Clip duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.len_frames() as f64 / self.format.sample_rate() as f64
    }

    /// Rewind to the first frame.
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl FrameSource for MemorySource {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn read(&mut self, out: &mut [f32]) -> usize {
        let end = self.format.whole_frames(self.samples.len());
        let n = self
            .format
            .whole_frames(out.len().min(end.saturating_sub(self.position)));
        out[..n].copy_from_slice(&self.samples[self.position..self.position + n]);
        self.position += n;
        n
    }
}
