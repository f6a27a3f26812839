//! Pull adapter around a block-oriented time-stretch engine.
//!
//! ## Read loop
//!
//! The engine consumes input in blocks of its own choosing and emits output
//! whenever an analysis window completes, so a single caller request can need
//! zero, one or many upstream pulls. Each `read` loops:
//!
//! 1. Hand out whatever is already staged in the output buffer.
//! 2. Stop if the stream is drained.
//! 3. While streaming, pull one staging block from the source and push it
//!    into the engine. Zero-sample pulls are debounced before the source is
//!    accepted as finished.
//! 4. On that transition, flush the engine exactly once.
//! 5. Refill the output buffer from the engine. Nothing back after the flush
//!    means the stream is drained.
//!
//! The loop is bounded by [`PipelineConfig::max_iterations`]; hitting the
//! bound logs a warning and returns whatever was produced.
//!
//! ## RT-Safety
//!
//! Both staging buffers are allocated in the constructor; `read` performs
//! no allocation of its own.

use std::sync::Arc;

use cliptempo_core::{
    AudioFormat, Error, EventSink, Events, FrameBuffer, FrameSource, PipelineConfig,
    PipelineEvent, Result, StageKind,
};
use tracing::{debug, trace, warn};

use super::engine::{TempoEngine, WindowSettings};

/// Lifecycle of a [`TempoStage`].
///
/// Transitions only move forward: `Streaming → Flushing → Drained`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoState {
    /// Source still feeding the engine.
    Streaming,
    /// Source exhausted and engine flushed; draining what the engine retained.
    Flushing,
    /// Nothing left anywhere; every `read` returns 0.
    Drained,
}

/// Time-stretch stage presenting an engine as a [`FrameSource`].
pub struct TempoStage<E> {
    source: Box<dyn FrameSource>,
    engine: E,
    format: AudioFormat,
    tempo: f32,
    config: PipelineConfig,
    input: FrameBuffer,
    output: FrameBuffer,
    state: TempoState,
    zero_reads: u32,
    events: Events,
}

impl<E: TempoEngine> TempoStage<E> {
    /// Wrap `source` with the default [`PipelineConfig`].
    pub fn new(source: Box<dyn FrameSource>, tempo: f32, engine: E) -> Result<Self> {
        Self::with_config(source, tempo, engine, PipelineConfig::default())
    }

    /// Wrap `source`, configuring `engine` for the source's format.
    ///
    /// Fails on a tempo that is not a finite positive number or an invalid
    /// config.
    pub fn with_config(
        source: Box<dyn FrameSource>,
        tempo: f32,
        mut engine: E,
        config: PipelineConfig,
    ) -> Result<Self> {
        if !tempo.is_finite() || tempo <= 0.0 {
            return Err(Error::InvalidTempo(tempo));
        }
        config.validate()?;

        let format = source.format();
        engine.configure(format, tempo, &WindowSettings::SHORT_EFFECTS);

        // A tempo below 1.0 expands the frame count, so give output twice the room.
        let input = FrameBuffer::new(format.channels(), config.staging_frames);
        let output = FrameBuffer::new(format.channels(), config.staging_frames * 2);

        debug!(
            tempo,
            sample_rate = format.sample_rate(),
            channels = format.channels(),
            staging_frames = config.staging_frames,
            "tempo stage created"
        );

        Ok(Self {
            source,
            engine,
            format,
            tempo,
            config,
            input,
            output,
            state: TempoState::Streaming,
            zero_reads: 0,
            events: Events::none(),
        })
    }

    /// Attach an event sink.
    pub fn with_events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Events::new(sink);
        self
    }

    pub fn tempo(&self) -> f32 {
        self.tempo
    }

    pub fn state(&self) -> TempoState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The wrapped source has been accepted as finished.
    pub fn source_exhausted(&self) -> bool {
        self.state != TempoState::Streaming
    }

    /// The engine has been flushed (happens together with exhaustion).
    pub fn engine_flushed(&self) -> bool {
        self.state != TempoState::Streaming
    }

    pub fn is_drained(&self) -> bool {
        self.state == TempoState::Drained
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Samples staged in the output buffer and not yet handed out.
    pub fn buffered_samples(&self) -> usize {
        self.output.available()
    }

    fn pull_upstream(&mut self) {
        let source = &mut self.source;
        let got = self.input.refill(|block| source.read(block));

        if got == 0 {
            self.zero_reads += 1;
            if self.zero_reads >= self.config.debounce_threshold {
                self.finish_source();
            } else {
                trace!(zero_reads = self.zero_reads, "source stalled");
                self.events.emit(PipelineEvent::SourceStalled {
                    consecutive_zero_reads: self.zero_reads,
                });
            }
            return;
        }

        self.zero_reads = 0;

        let dropped = self.input.truncate_to_frames();
        if dropped > 0 {
            warn!(
                samples = dropped,
                channels = self.format.channels(),
                "source returned a partial frame, discarding tail"
            );
            self.events
                .emit(PipelineEvent::PartialFrameDiscarded { samples: dropped });
        }

        if !self.input.is_empty() {
            trace!(frames = self.format.frames_in(self.input.available()), "feeding engine");
            self.engine.put_frames(self.input.unread());
        }
        self.input.clear();
    }

    /// Streaming → Flushing. The only place the engine is flushed.
    fn finish_source(&mut self) {
        debug!(zero_reads = self.zero_reads, "source exhausted, flushing engine");
        self.events.emit(PipelineEvent::SourceExhausted);
        self.engine.flush();
        self.state = TempoState::Flushing;
        self.events.emit(PipelineEvent::EngineFlushed);
    }

    /// Refill the output buffer from the engine; returns frames received.
    fn pull_engine(&mut self) -> usize {
        let engine = &mut self.engine;
        let channels = self.format.channels();
        let count = self
            .output
            .refill(|block| engine.receive_frames(block).saturating_mul(channels));
        self.format.frames_in(count)
    }
}

impl<E: TempoEngine> FrameSource for TempoStage<E> {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn read(&mut self, out: &mut [f32]) -> usize {
        let want = self.format.whole_frames(out.len());
        let mut produced = 0;
        let mut iterations = 0;

        while produced < want {
            if iterations >= self.config.max_iterations {
                warn!(
                    iterations,
                    produced,
                    requested = want,
                    "tempo stage hit iteration cap, returning partial block"
                );
                self.events.emit(PipelineEvent::IterationCapReached {
                    stage: StageKind::Tempo,
                    iterations,
                });
                break;
            }
            iterations += 1;

            produced += self.output.drain_into(&mut out[produced..want]);
            if produced >= want {
                break;
            }

            if self.state == TempoState::Drained {
                break;
            }

            if self.state == TempoState::Streaming {
                self.pull_upstream();
            }

            if self.pull_engine() == 0 && self.state == TempoState::Flushing {
                debug!(produced, "tempo stage drained");
                self.state = TempoState::Drained;
                self.events.emit(PipelineEvent::StreamDrained);
                break;
            }
        }

        produced
    }
}
