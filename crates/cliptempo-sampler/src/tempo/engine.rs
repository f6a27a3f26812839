//! Interface to block-oriented time-stretch engines.

use cliptempo_core::AudioFormat;

/// Window lengths handed to the engine at configuration time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSettings {
    /// Length of one processing sequence in milliseconds.
    pub sequence_ms: f32,
    /// Search range for the best overlap position in milliseconds.
    pub seek_window_ms: f32,
    /// Crossfade length between sequences in milliseconds.
    pub overlap_ms: f32,
}

impl WindowSettings {
    /// Short windows for sound effects of a few hundred milliseconds.
    pub const SHORT_EFFECTS: WindowSettings = WindowSettings {
        sequence_ms: 40.0,
        seek_window_ms: 15.0,
        overlap_ms: 8.0,
    };
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self::SHORT_EFFECTS
    }
}

/// An opaque block-oriented time-stretch engine.
///
/// Input and output are decoupled: frames pushed with `put_frames` may come
/// back later, in different block sizes, and some are held inside the
/// engine's analysis windows until `flush` is called. All slices are
/// interleaved at the configured channel count.
pub trait TempoEngine: Send {
    /// Called once before any frames are pushed.
    fn configure(&mut self, format: AudioFormat, tempo: f32, settings: &WindowSettings);

    /// Push whole frames of input.
    fn put_frames(&mut self, samples: &[f32]);

    /// Pop up to `out.len() / channels` frames; returns the number of frames
    /// written (0 when nothing is ready).
    fn receive_frames(&mut self, out: &mut [f32]) -> usize;

    /// No more input will arrive; make retained frames available to
    /// `receive_frames`.
    fn flush(&mut self);
}

impl TempoEngine for Box<dyn TempoEngine> {
    fn configure(&mut self, format: AudioFormat, tempo: f32, settings: &WindowSettings) {
        (**self).configure(format, tempo, settings)
    }

    fn put_frames(&mut self, samples: &[f32]) {
        (**self).put_frames(samples)
    }

    fn receive_frames(&mut self, out: &mut [f32]) -> usize {
        (**self).receive_frames(out)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_effect_windows() {
        let settings = WindowSettings::default();
        assert_eq!(settings.sequence_ms, 40.0);
        assert_eq!(settings.seek_window_ms, 15.0);
        assert_eq!(settings.overlap_ms, 8.0);
    }
}
