//! Gapless concatenation of finite sources.
//!
//! Sources are played strictly in order. A source is left behind only when a
//! pull returns nothing; a short but non-empty pull is taken as buffering,
//! not as the end of the clip. The seam is sample-exact: nothing is
//! interpolated, faded or padded, so clips that end on a frame boundary join
//! without a gap.

use std::sync::Arc;

use cliptempo_core::{
    AudioFormat, Error, EventSink, Events, FrameSource, PipelineConfig, PipelineEvent, Result,
    StageKind,
};
use tracing::{debug, trace, warn};

/// Several same-format sources presented as one.
pub struct ConcatStage {
    sources: Vec<Box<dyn FrameSource>>,
    format: AudioFormat,
    current: usize,
    max_iterations: usize,
    events: Events,
}

impl ConcatStage {
    /// Concatenate `sources` in order with the default [`PipelineConfig`].
    pub fn new(sources: Vec<Box<dyn FrameSource>>) -> Result<Self> {
        Self::with_config(sources, PipelineConfig::default())
    }

    /// Fails on an empty list or when any source's format differs from the
    /// first one.
    pub fn with_config(sources: Vec<Box<dyn FrameSource>>, config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let format = sources.first().ok_or(Error::NoSources)?.format();
        if let Some((index, found)) = sources
            .iter()
            .map(|s| s.format())
            .enumerate()
            .find(|(_, f)| !f.is_compatible(&format))
        {
            return Err(Error::FormatMismatch {
                index,
                expected: format,
                found,
            });
        }

        debug!(sources = sources.len(), %format, "concat stage created");

        Ok(Self {
            sources,
            format,
            current: 0,
            max_iterations: config.max_iterations,
            events: Events::none(),
        })
    }

    /// Attach an event sink.
    pub fn with_events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Events::new(sink);
        self
    }

    /// Index of the source currently being played.
    ///
    /// Equal to [`source_count`](Self::source_count) once every source is
    /// exhausted.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn is_drained(&self) -> bool {
        self.current >= self.sources.len()
    }

    fn advance(&mut self) {
        let from = self.current;
        self.current += 1;
        debug!(from, to = self.current, total = self.sources.len(), "source finished, advancing");
        self.events
            .emit(PipelineEvent::SourceAdvanced { from, to: self.current });
    }
}

impl FrameSource for ConcatStage {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn read(&mut self, out: &mut [f32]) -> usize {
        let want = self.format.whole_frames(out.len());
        let channels = self.format.channels();
        let mut produced = 0;
        let mut iterations = 0;

        // Less than a frame of room left would look like an exhausted source.
        while want - produced >= channels && self.current < self.sources.len() {
            if iterations >= self.max_iterations {
                warn!(
                    iterations,
                    produced,
                    requested = want,
                    source = self.current,
                    "concat stage hit iteration cap, returning partial block"
                );
                self.events.emit(PipelineEvent::IterationCapReached {
                    stage: StageKind::Concat,
                    iterations,
                });
                break;
            }
            iterations += 1;

            let n = self.sources[self.current].read(&mut out[produced..want]);
            if n == 0 {
                self.advance();
                continue;
            }

            trace!(source = self.current, samples = n, "concat pulled");
            produced += n;
        }

        produced
    }
}
