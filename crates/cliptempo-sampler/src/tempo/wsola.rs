//! WSOLA engine: pitch-preserving time-stretch in the time domain.
//!
//! ## Algorithm Overview
//!
//! 1. **Sequences**: Cut the input into sequences of `sequence_ms`, each
//!    starting `tempo * (sequence - overlap)` frames after the previous one
//! 2. **Seek**: Within `seek_window_ms` of the nominal start, pick the offset
//!    whose first `overlap_ms` best correlates with the previous tail
//! 3. **Crossfade**: Overlap-add the previous tail and the new sequence with
//!    a raised-cosine fade, then copy the body through unchanged
//!
//! Every sequence emits `sequence - overlap` frames, so output length is
//! `input / tempo` while the waveform inside each sequence (and with it the
//! pitch) is left as recorded. `flush` pads the last sequence with silence
//! and trims the output to exactly `round(frames_in / tempo)` frames.

use std::f32::consts::PI;

use cliptempo_core::AudioFormat;
use tracing::debug;

use super::engine::{TempoEngine, WindowSettings};

/// Waveform-similarity overlap-add stretcher driven by [`WindowSettings`].
#[derive(Debug, Clone)]
pub struct WsolaEngine {
    channels: usize,
    tempo: f64,

    // Window lengths in frames (0 until configured)
    sequence: usize,
    seek: usize,
    overlap: usize,

    /// Input frames between consecutive sequence starts
    nominal_skip: f64,
    skip_fract: f64,
    /// Fade-in gain per overlap frame
    fade: Vec<f32>,

    input: Vec<f32>,
    /// Tail of the previous sequence, `overlap` frames
    mid: Vec<f32>,
    output: Vec<f32>,

    frames_in: u64,
    frames_produced: u64,
    started: bool,
    flushed: bool,
}

impl Default for WsolaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WsolaEngine {
    pub fn new() -> Self {
        Self {
            channels: 1,
            tempo: 1.0,
            sequence: 0,
            seek: 0,
            overlap: 0,
            nominal_skip: 0.0,
            skip_fract: 0.0,
            fade: Vec::new(),
            input: Vec::new(),
            mid: Vec::new(),
            output: Vec::new(),
            frames_in: 0,
            frames_produced: 0,
            started: false,
            flushed: false,
        }
    }

    /// Sequence, seek and overlap lengths in frames after `configure`.
    pub fn window_frames(&self) -> (usize, usize, usize) {
        (self.sequence, self.seek, self.overlap)
    }

    /// Frames that must be buffered before one sequence can be processed.
    fn required_frames(&self) -> usize {
        (self.sequence + self.seek).max(self.nominal_skip.ceil() as usize + 1)
    }

    fn input_frames(&self) -> usize {
        self.input.len() / self.channels
    }

    fn process_available(&mut self) {
        if self.sequence == 0 {
            return;
        }
        let required = self.required_frames();
        while self.input_frames() >= required {
            self.process_sequence();
        }
    }

    /// Offset within the seek window that best continues the previous tail.
    fn seek_best_overlap(&self) -> usize {
        let span = self.overlap * self.channels;
        let mut best = 0;
        let mut best_score = f64::MIN;

        for offset in 0..self.seek.max(1) {
            let start = offset * self.channels;
            let candidate = &self.input[start..start + span];
            let mut corr = 0.0f64;
            let mut norm = 0.0f64;
            for (&a, &b) in self.mid.iter().zip(candidate) {
                corr += a as f64 * b as f64;
                norm += b as f64 * b as f64;
            }
            let score = if norm > 0.0 { corr / norm.sqrt() } else { 0.0 };
            if score > best_score {
                best_score = score;
                best = offset;
            }
        }
        best
    }

    fn process_sequence(&mut self) {
        let ch = self.channels;
        let body_end = self.sequence - self.overlap;

        let offset = if self.started {
            let offset = self.seek_best_overlap();
            for i in 0..self.overlap {
                let gain = self.fade[i];
                for c in 0..ch {
                    let prev = self.mid[i * ch + c];
                    let next = self.input[(offset + i) * ch + c];
                    self.output.push(prev * (1.0 - gain) + next * gain);
                }
            }
            let body = (offset + self.overlap) * ch..(offset + body_end) * ch;
            self.output.extend_from_slice(&self.input[body]);
            offset
        } else {
            self.output.extend_from_slice(&self.input[..body_end * ch]);
            self.started = true;
            0
        };

        let tail = (offset + body_end) * ch..(offset + self.sequence) * ch;
        self.mid.copy_from_slice(&self.input[tail]);
        self.frames_produced += body_end as u64;

        self.skip_fract += self.nominal_skip;
        let skip = (self.skip_fract.floor() as usize).min(self.input_frames());
        self.skip_fract -= skip as f64;
        self.input.drain(..skip * ch);
    }
}

impl TempoEngine for WsolaEngine {
    fn configure(&mut self, format: AudioFormat, tempo: f32, settings: &WindowSettings) {
        let overlap = format.frames_for_ms(settings.overlap_ms);
        let sequence = format.frames_for_ms(settings.sequence_ms).max(2 * overlap);
        let seek = format.frames_for_ms(settings.seek_window_ms);

        self.channels = format.channels();
        self.tempo = tempo as f64;
        self.sequence = sequence;
        self.seek = seek;
        self.overlap = overlap;
        self.nominal_skip = self.tempo * (sequence - overlap) as f64;
        self.skip_fract = 0.0;
        self.fade = (0..overlap)
            .map(|i| 0.5 * (1.0 - (PI * i as f32 / overlap as f32).cos()))
            .collect();
        self.input.clear();
        self.input.reserve(format.samples_in(self.required_frames()));
        self.mid = vec![0.0; format.samples_in(overlap)];
        self.output.clear();
        self.frames_in = 0;
        self.frames_produced = 0;
        self.started = false;
        self.flushed = false;

        debug!(
            tempo,
            sequence_frames = sequence,
            seek_frames = seek,
            overlap_frames = overlap,
            "wsola engine configured"
        );
    }

    fn put_frames(&mut self, samples: &[f32]) {
        if self.flushed {
            return;
        }
        let whole = samples.len() - samples.len() % self.channels;
        self.input.extend_from_slice(&samples[..whole]);
        self.frames_in += (whole / self.channels) as u64;
        self.process_available();
    }

    fn receive_frames(&mut self, out: &mut [f32]) -> usize {
        let ch = self.channels;
        let frames = (self.output.len() / ch).min(out.len() / ch);
        out[..frames * ch].copy_from_slice(&self.output[..frames * ch]);
        self.output.drain(..frames * ch);
        frames
    }

    fn flush(&mut self) {
        if self.flushed || self.sequence == 0 {
            return;
        }
        self.flushed = true;

        let target = (self.frames_in as f64 / self.tempo).round() as u64;
        let required = self.required_frames();
        while self.frames_produced < target {
            let missing = required.saturating_sub(self.input_frames());
            self.input.resize(self.input.len() + missing * self.channels, 0.0);
            self.process_sequence();
        }

        let excess = (self.frames_produced - target) as usize;
        let keep = self.output.len().saturating_sub(excess * self.channels);
        self.output.truncate(keep);
        self.frames_produced = target;
        self.input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE_RATE: u32 = 44100;

    fn engine(format: AudioFormat, tempo: f32) -> WsolaEngine {
        let mut engine = WsolaEngine::new();
        engine.configure(format, tempo, &WindowSettings::SHORT_EFFECTS);
        engine
    }

    fn drain(engine: &mut WsolaEngine, channels: usize) -> Vec<f32> {
        let mut all = Vec::new();
        let mut out = vec![0.0; 512 * channels];
        loop {
            let frames = engine.receive_frames(&mut out);
            if frames == 0 {
                return all;
            }
            all.extend_from_slice(&out[..frames * channels]);
        }
    }

    fn sine(freq: f32, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|i| (2.0 * PI * freq * i as f32 / SAMPLE_RATE as f32).sin() * 0.5)
            .collect()
    }

    /// Frequency estimate from rising zero crossings.
    fn estimate_hz(samples: &[f32]) -> f32 {
        let rising = samples
            .windows(2)
            .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
            .count();
        rising as f32 * SAMPLE_RATE as f32 / samples.len() as f32
    }

    #[test]
    fn test_window_frames_follow_settings() {
        let e = engine(AudioFormat::mono(SAMPLE_RATE), 1.5);
        assert_eq!(e.window_frames(), (1764, 662, 353));
    }

    #[test]
    fn test_faster_tempo_keeps_pitch() {
        let fmt = AudioFormat::mono(SAMPLE_RATE);
        let input = sine(440.0, SAMPLE_RATE as usize);
        let mut e = engine(fmt, 2.0);
        e.put_frames(&input);
        e.flush();

        let out = drain(&mut e, 1);
        assert_eq!(out.len(), input.len() / 2);

        let margin = 2048;
        let in_hz = estimate_hz(&input[margin..input.len() - margin]);
        let out_hz = estimate_hz(&out[margin..out.len() - margin]);
        assert_relative_eq!(in_hz, 440.0, max_relative = 0.02);
        assert_relative_eq!(out_hz, 440.0, max_relative = 0.05);
    }

    #[test]
    fn test_slower_tempo_keeps_pitch() {
        let fmt = AudioFormat::mono(SAMPLE_RATE);
        let input = sine(440.0, 22050);
        let mut e = engine(fmt, 0.5);
        e.put_frames(&input);
        e.flush();

        let out = drain(&mut e, 1);
        assert_eq!(out.len(), 44100);
        let out_hz = estimate_hz(&out[2048..out.len() - 2048]);
        assert_relative_eq!(out_hz, 440.0, max_relative = 0.05);
    }

    #[test]
    fn test_flush_trims_to_exact_length() {
        let fmt = AudioFormat::stereo(SAMPLE_RATE);
        for (tempo, frames, expected) in [(1.5, 900, 600), (2.0, 100, 50), (0.1, 100, 1000)] {
            let mut e = engine(fmt, tempo);
            e.put_frames(&vec![0.25; fmt.samples_in(frames)]);
            assert!(drain(&mut e, 2).is_empty(), "short input is held back");
            e.flush();
            let out = drain(&mut e, 2);
            assert_eq!(fmt.frames_in(out.len()), expected, "tempo {}", tempo);
        }
    }

    #[test]
    fn test_output_streams_before_flush() {
        let fmt = AudioFormat::mono(SAMPLE_RATE);
        let mut e = engine(fmt, 1.25);
        e.put_frames(&sine(300.0, 20_000));
        let streamed = drain(&mut e, 1).len();
        assert!(streamed > 0);
        assert!(streamed <= 16_000);

        e.flush();
        assert_eq!(streamed + drain(&mut e, 1).len(), 16_000);
    }

    #[test]
    fn test_blocks_can_arrive_in_pieces() {
        let fmt = AudioFormat::stereo(SAMPLE_RATE);
        let input: Vec<f32> = (0..fmt.samples_in(6000))
            .map(|i| (i as f32 * 0.01).sin())
            .collect();

        let mut whole = engine(fmt, 1.5);
        whole.put_frames(&input);
        whole.flush();
        let expected = drain(&mut whole, 2);

        let mut split = engine(fmt, 1.5);
        let mut got = Vec::new();
        for chunk in input.chunks(fmt.samples_in(333)) {
            split.put_frames(chunk);
            got.extend(drain(&mut split, 2));
        }
        split.flush();
        got.extend(drain(&mut split, 2));

        assert_eq!(got, expected);
    }

    #[test]
    fn test_silence_stays_silent() {
        let fmt = AudioFormat::stereo(8000);
        let mut e = engine(fmt, 0.75);
        e.put_frames(&vec![0.0; fmt.samples_in(1200)]);
        e.flush();
        let out = drain(&mut e, 2);
        assert_eq!(fmt.frames_in(out.len()), 1600);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_unconfigured_engine_is_silent() {
        let mut e = WsolaEngine::new();
        e.put_frames(&[0.5; 64]);
        e.flush();
        let mut out = [0.0; 16];
        assert_eq!(e.receive_frames(&mut out), 0);
    }
}
