//! Time-stretching via signalsmith-stretch
//!
//! signalsmith-stretch works on paired input/output blocks: the stretch ratio
//! is implied by the two slice lengths. This adapter buffers pushed frames and
//! derives the output length from the tempo, carrying the fractional part
//! between blocks so long clips do not drift. After `flush` the stretcher's
//! output latency is rendered once and handed out across as many
//! `receive_frames` calls as the caller's block size needs.

use cliptempo_core::AudioFormat;
use signalsmith_stretch::Stretch;
use tracing::debug;

use super::engine::{TempoEngine, WindowSettings};

/// Pitch-preserving engine backed by signalsmith-stretch.
///
/// Window lengths are fixed by the library preset and override the requested
/// [`WindowSettings`], which are only logged at configuration time. Use
/// [`WsolaEngine`](super::WsolaEngine) when the windows must follow the
/// settings.
pub struct SignalsmithEngine {
    stretcher: Option<Stretch>,
    channels: usize,
    tempo: f64,
    pending: Vec<f32>,
    /// Fractional output frames carried to the next block
    carry: f64,
    flushed: bool,
    /// Output latency rendered by `Stretch::flush`
    tail: Vec<f32>,
    /// Next sample of `tail` to hand out
    tail_pos: usize,
    tail_rendered: bool,
    cheaper: bool,
}

impl Default for SignalsmithEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalsmithEngine {
    /// Use signalsmith-stretch's default quality preset.
    pub fn new() -> Self {
        Self {
            stretcher: None,
            channels: 1,
            tempo: 1.0,
            pending: Vec::new(),
            carry: 0.0,
            flushed: false,
            tail: Vec::new(),
            tail_pos: 0,
            tail_rendered: false,
            cheaper: false,
        }
    }

    /// Use `preset_cheaper`: faster, slightly lower quality.
    pub fn cheaper() -> Self {
        Self {
            cheaper: true,
            ..Self::new()
        }
    }

    /// Output latency of the configured stretcher in frames.
    pub fn output_latency(&self) -> usize {
        self.stretcher
            .as_ref()
            .map(|s| s.output_latency())
            .unwrap_or(0)
    }
}

impl TempoEngine for SignalsmithEngine {
    fn configure(&mut self, format: AudioFormat, tempo: f32, settings: &WindowSettings) {
        let channels = format.channels() as u32;
        let stretcher = if self.cheaper {
            Stretch::preset_cheaper(channels, format.sample_rate())
        } else {
            Stretch::preset_default(channels, format.sample_rate())
        };

        debug!(
            sequence_frames = format.frames_for_ms(settings.sequence_ms),
            seek_frames = format.frames_for_ms(settings.seek_window_ms),
            overlap_frames = format.frames_for_ms(settings.overlap_ms),
            input_latency = stretcher.input_latency(),
            output_latency = stretcher.output_latency(),
            "signalsmith stretcher configured"
        );

        self.tail = vec![0.0; format.samples_in(stretcher.output_latency())];
        self.tail_pos = 0;
        self.tail_rendered = false;
        self.stretcher = Some(stretcher);
        self.channels = format.channels();
        self.tempo = tempo as f64;
        self.pending.clear();
        self.carry = 0.0;
        self.flushed = false;
    }

    fn put_frames(&mut self, samples: &[f32]) {
        let whole = samples.len() - samples.len() % self.channels;
        self.pending.extend_from_slice(&samples[..whole]);
    }

    fn receive_frames(&mut self, out: &mut [f32]) -> usize {
        let Some(stretcher) = self.stretcher.as_mut() else {
            return 0;
        };
        let ch = self.channels;
        let max_out = out.len() / ch;
        let available = self.pending.len() / ch;

        if available > 0 && max_out > 0 {
            let take_in = available.min(((max_out as f64) * self.tempo).floor() as usize);
            let exact = take_in as f64 / self.tempo + self.carry;
            let mut out_frames = exact.floor() as usize;
            if self.flushed && take_in == available {
                // Last block: round up so no input is left behind
                out_frames = exact.ceil() as usize;
            }
            let out_frames = out_frames.min(max_out);

            if take_in > 0 && out_frames > 0 {
                self.carry = (exact - out_frames as f64).max(0.0);
                let output = &mut out[..out_frames * ch];
                output.fill(0.0);
                stretcher.process(&self.pending[..take_in * ch], output);
                self.pending.drain(..take_in * ch);
                return out_frames;
            }
            if !self.flushed {
                return 0;
            }
            // Flushed with less than one output frame of input left
            self.pending.clear();
        }

        if !self.flushed {
            return 0;
        }
        if !self.tail_rendered {
            stretcher.flush(&mut self.tail);
            self.tail_rendered = true;
        }
        let n = ((self.tail.len() - self.tail_pos) / ch).min(max_out);
        out[..n * ch].copy_from_slice(&self.tail[self.tail_pos..self.tail_pos + n * ch]);
        self.tail_pos += n * ch;
        n
    }

    fn flush(&mut self) {
        self.flushed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(engine: &mut SignalsmithEngine, channels: usize) -> usize {
        drain_in_blocks(engine, channels, 16384)
    }

    fn drain_in_blocks(engine: &mut SignalsmithEngine, channels: usize, block: usize) -> usize {
        let mut out = vec![0.0; block * channels];
        let mut total = 0;
        loop {
            let frames = engine.receive_frames(&mut out);
            if frames == 0 {
                return total;
            }
            assert!(out[..frames * channels].iter().all(|s| s.is_finite()));
            total += frames;
        }
    }

    #[test]
    fn test_output_length_follows_tempo() {
        let fmt = AudioFormat::stereo(44100);
        let mut engine = SignalsmithEngine::new();
        engine.configure(fmt, 2.0, &WindowSettings::SHORT_EFFECTS);
        let latency = engine.output_latency();

        engine.put_frames(&vec![0.25; fmt.samples_in(8000)]);
        let streamed = drain(&mut engine, 2);
        assert_eq!(streamed, 4000);

        engine.flush();
        assert_eq!(drain(&mut engine, 2), latency);
    }

    #[test]
    fn test_tail_survives_small_blocks() {
        let fmt = AudioFormat::stereo(44100);
        let mut engine = SignalsmithEngine::new();
        engine.configure(fmt, 1.5, &WindowSettings::SHORT_EFFECTS);
        let latency = engine.output_latency();
        assert!(latency > 128, "latency {} fits one block", latency);

        engine.put_frames(&vec![0.25; fmt.samples_in(3000)]);
        let streamed = drain_in_blocks(&mut engine, 2, 128);
        engine.flush();
        let rest = drain_in_blocks(&mut engine, 2, 128);
        assert_eq!(streamed + rest, 2000 + latency);
    }

    #[test]
    fn test_tail_through_stage_with_small_staging() {
        use crate::tempo::TempoStage;
        use cliptempo_core::{drain_to_vec, MemorySource, PipelineConfig};

        let fmt = AudioFormat::mono(44100);
        let latency = {
            let mut reference = SignalsmithEngine::new();
            reference.configure(fmt, 2.0, &WindowSettings::SHORT_EFFECTS);
            reference.output_latency()
        };

        let clip = MemorySource::silence(fmt, 4000);
        let config = PipelineConfig::default().staging_frames(64);
        let mut stage =
            TempoStage::with_config(Box::new(clip), 2.0, SignalsmithEngine::new(), config)
                .unwrap();
        let samples = drain_to_vec(&mut stage, 100);
        assert_eq!(fmt.frames_in(samples.len()), 2000 + latency);
    }

    #[test]
    fn test_unconfigured_engine_is_silent() {
        let mut engine = SignalsmithEngine::cheaper();
        engine.put_frames(&[0.0; 16]);
        let mut out = [0.0; 16];
        assert_eq!(engine.receive_frames(&mut out), 0);
    }
}
