//! Test helpers and fixtures for cliptempo integration tests
//!
//! Scripted sources stand in for decoders with irregular delivery, and
//! instrumented engines record what a tempo stage asks of them.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (pass-through, unity tempo)
//! - `INT16_EPSILON`: Round trips through PCM16 WAV fixtures

#![allow(dead_code)]

pub mod tolerances;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cliptempo::sampler::{TempoEngine, WindowSettings};
use cliptempo::{AudioFormat, FrameSource, MemorySource};
use parking_lot::Mutex;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: u32 = 44100;

/// Route pipeline logs to the test harness output (shown for failing tests).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Duplicate a mono signal across `channels` interleaved channels.
pub fn interleave(mono: &[f32], channels: usize) -> Vec<f32> {
    mono.iter()
        .flat_map(|&s| std::iter::repeat(s).take(channels))
        .collect()
}

/// Frame staircase: every sample of frame `i` equals `start + i`.
///
/// Used for exact verification of ordering across seams.
pub fn frame_staircase(format: AudioFormat, start: usize, frames: usize) -> Vec<f32> {
    let mono: Vec<f32> = (start..start + frames).map(|i| i as f32).collect();
    interleave(&mono, format.channels())
}

/// In-memory clip holding a frame staircase.
pub fn staircase_clip(format: AudioFormat, start: usize, frames: usize) -> Box<dyn FrameSource> {
    Box::new(MemorySource::new(frame_staircase(format, start, frames), format))
}

/// Assert that each frame's value is exactly one more than the previous one.
pub fn assert_frames_monotonic(samples: &[f32], channels: usize, first: f32) {
    for (i, frame) in samples.chunks(channels).enumerate() {
        let expected = first + i as f32;
        assert!(
            frame.iter().all(|&s| s == expected),
            "frame {} was {:?}, expected {}",
            i,
            frame,
            expected
        );
    }
}

/// Pull with a fixed request size until a read returns 0, returning every
/// read's length along with the collected samples.
pub fn pull_all(source: &mut dyn FrameSource, request: usize) -> (Vec<usize>, Vec<f32>) {
    let mut scratch = vec![0.0; request];
    let mut lengths = Vec::new();
    let mut collected = Vec::new();
    loop {
        let n = source.read(&mut scratch);
        lengths.push(n);
        if n == 0 {
            return (lengths, collected);
        }
        collected.extend_from_slice(&scratch[..n]);
    }
}

// =============================================================================
// Scripted Sources
// =============================================================================

/// One scripted response of a [`ScriptedSource`].
#[derive(Debug, Clone)]
pub enum Step {
    /// Deliver these samples, possibly across several reads.
    Samples(Vec<f32>),
    /// Return 0 once.
    Stall,
}

/// Source replaying a fixed script, then returning 0 forever.
///
/// Each read delivers at most `max_per_read` samples, which makes a short
/// read look exactly like a slow decoder.
pub struct ScriptedSource {
    format: AudioFormat,
    steps: VecDeque<Step>,
    max_per_read: usize,
    reads: Arc<Mutex<usize>>,
}

impl ScriptedSource {
    pub fn new(format: AudioFormat, steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            format,
            steps: steps.into_iter().collect(),
            max_per_read: usize::MAX,
            reads: Arc::new(Mutex::new(0)),
        }
    }

    pub fn max_per_read(mut self, samples: usize) -> Self {
        self.max_per_read = samples;
        self
    }

    /// Shared counter of `read` calls, usable after the source is boxed.
    pub fn read_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.reads)
    }
}

impl FrameSource for ScriptedSource {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn read(&mut self, out: &mut [f32]) -> usize {
        *self.reads.lock() += 1;
        match self.steps.front_mut() {
            None => 0,
            Some(Step::Stall) => {
                self.steps.pop_front();
                0
            }
            Some(Step::Samples(samples)) => {
                let n = samples.len().min(out.len()).min(self.max_per_read);
                out[..n].copy_from_slice(&samples[..n]);
                samples.drain(..n);
                if samples.is_empty() {
                    self.steps.pop_front();
                }
                n
            }
        }
    }
}

/// Never-ending source that hands out `samples_per_read` samples per pull.
pub struct TrickleSource {
    format: AudioFormat,
    samples_per_read: usize,
}

impl TrickleSource {
    pub fn new(format: AudioFormat, samples_per_read: usize) -> Self {
        Self {
            format,
            samples_per_read,
        }
    }
}

impl FrameSource for TrickleSource {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn read(&mut self, out: &mut [f32]) -> usize {
        let n = self.samples_per_read.min(out.len());
        out[..n].fill(0.1);
        n
    }
}

// =============================================================================
// Instrumented Engines
// =============================================================================

/// What a [`CountingEngine`] was asked to do.
#[derive(Debug, Default, Clone)]
pub struct EngineStats {
    pub configured: Vec<(AudioFormat, f32, WindowSettings)>,
    pub frames_in: usize,
    pub frames_out: usize,
    pub flushes: usize,
    /// `put_frames` calls made after a flush
    pub puts_after_flush: usize,
}

/// Wraps an engine and records every call into shared [`EngineStats`].
pub struct CountingEngine<E> {
    inner: E,
    channels: usize,
    stats: Arc<Mutex<EngineStats>>,
}

impl<E: TempoEngine> CountingEngine<E> {
    pub fn new(inner: E) -> (Self, Arc<Mutex<EngineStats>>) {
        let stats = Arc::new(Mutex::new(EngineStats::default()));
        (
            Self {
                inner,
                channels: 1,
                stats: Arc::clone(&stats),
            },
            stats,
        )
    }
}

impl<E: TempoEngine> TempoEngine for CountingEngine<E> {
    fn configure(&mut self, format: AudioFormat, tempo: f32, settings: &WindowSettings) {
        self.channels = format.channels();
        self.stats.lock().configured.push((format, tempo, *settings));
        self.inner.configure(format, tempo, settings);
    }

    fn put_frames(&mut self, samples: &[f32]) {
        {
            let mut stats = self.stats.lock();
            stats.frames_in += samples.len() / self.channels;
            if stats.flushes > 0 {
                stats.puts_after_flush += 1;
            }
        }
        self.inner.put_frames(samples);
    }

    fn receive_frames(&mut self, out: &mut [f32]) -> usize {
        let frames = self.inner.receive_frames(out);
        self.stats.lock().frames_out += frames;
        frames
    }

    fn flush(&mut self) {
        self.stats.lock().flushes += 1;
        self.inner.flush();
    }
}

/// Engine that swallows everything and never produces output.
#[derive(Debug, Default)]
pub struct StuckEngine;

impl TempoEngine for StuckEngine {
    fn configure(&mut self, _format: AudioFormat, _tempo: f32, _settings: &WindowSettings) {}

    fn put_frames(&mut self, _samples: &[f32]) {}

    fn receive_frames(&mut self, _out: &mut [f32]) -> usize {
        0
    }

    fn flush(&mut self) {}
}

// =============================================================================
// WAV Fixtures
// =============================================================================

/// Save samples as a PCM16 WAV file.
pub fn save_wav_file_pcm16(path: &Path, format: AudioFormat, samples: &[f32]) -> PathBuf {
    let spec = hound::WavSpec {
        channels: format.channels() as u16,
        sample_rate: format.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");
    for &s in samples {
        let value = (s.clamp(-1.0, 1.0) * 32767.0).round() as i16;
        writer.write_sample(value).expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV file");
    path.to_path_buf()
}
