//! Varispeed engine: speed change by resampling.
//!
//! Reads the input at `tempo` frames per output frame with linear
//! interpolation, so pitch moves with speed. It has no external dependencies
//! and keeps one frame of look-ahead (the right-hand interpolation point),
//! which `flush` releases.

use cliptempo_core::AudioFormat;

use super::engine::{TempoEngine, WindowSettings};

/// Linear-interpolation resampler behind the [`TempoEngine`] interface.
#[derive(Debug, Clone)]
pub struct VarispeedEngine {
    channels: usize,
    tempo: f64,
    pending: Vec<f32>,
    /// Fractional read position in frames, relative to the start of `pending`.
    position: f64,
    flushed: bool,
}

impl Default for VarispeedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl VarispeedEngine {
    pub fn new() -> Self {
        Self {
            channels: 1,
            tempo: 1.0,
            pending: Vec::new(),
            position: 0.0,
            flushed: false,
        }
    }

    /// Input frames pushed but not yet consumed.
    pub fn pending_frames(&self) -> usize {
        self.pending.len() / self.channels
    }
}

impl TempoEngine for VarispeedEngine {
    fn configure(&mut self, format: AudioFormat, tempo: f32, settings: &WindowSettings) {
        self.channels = format.channels();
        self.tempo = tempo as f64;
        self.pending.clear();
        // Room for one sequence window of input before the first drain.
        self.pending
            .reserve(format.samples_in(format.frames_for_ms(settings.sequence_ms)));
        self.position = 0.0;
        self.flushed = false;
    }

    fn put_frames(&mut self, samples: &[f32]) {
        let whole = samples.len() - samples.len() % self.channels;
        self.pending.extend_from_slice(&samples[..whole]);
    }

    fn receive_frames(&mut self, out: &mut [f32]) -> usize {
        let ch = self.channels;
        let available = self.pending.len() / ch;
        let max_out = out.len() / ch;
        let mut written = 0;

        while written < max_out {
            let index = self.position.floor() as usize;
            let frac = (self.position - index as f64) as f32;
            let dst = &mut out[written * ch..(written + 1) * ch];

            if index + 1 < available {
                let a = &self.pending[index * ch..(index + 1) * ch];
                let b = &self.pending[(index + 1) * ch..(index + 2) * ch];
                for c in 0..ch {
                    dst[c] = a[c] + (b[c] - a[c]) * frac;
                }
            } else if self.flushed && index < available {
                dst.copy_from_slice(&self.pending[index * ch..(index + 1) * ch]);
            } else {
                break;
            }

            written += 1;
            self.position += self.tempo;
        }

        let consumed = (self.position.floor() as usize).min(available);
        self.pending.drain(..consumed * ch);
        self.position -= consumed as f64;

        written
    }

    fn flush(&mut self) {
        self.flushed = true;
    }
}
