//! Optional structured events emitted by pipeline stages.
//!
//! Stages always log through `tracing`; attaching an [`EventSink`] adds a
//! typed feed of the same lifecycle transitions for callers that want to
//! observe or assert on them.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Which stage emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Tempo,
    Concat,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Tempo => f.write_str("tempo"),
            StageKind::Concat => f.write_str("concat"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The wrapped source returned nothing, below the debounce threshold.
    SourceStalled { consecutive_zero_reads: u32 },
    /// The wrapped source was accepted as finished.
    SourceExhausted,
    /// The engine was asked to release its retained frames.
    EngineFlushed,
    /// A pull ended mid-frame; the partial tail was dropped.
    PartialFrameDiscarded { samples: usize },
    /// The tempo stage has nothing more to give.
    StreamDrained,
    /// Concatenation moved past an exhausted source.
    SourceAdvanced { from: usize, to: usize },
    /// A `read` hit its iteration cap and returned early.
    IterationCapReached { stage: StageKind, iterations: usize },
}

/// Receiver of pipeline events.
///
/// Called synchronously from inside `read`, so implementations should be
/// quick and must not pull from the pipeline.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Optional sink handle held by a stage.
#[derive(Clone, Default)]
pub struct Events(Option<Arc<dyn EventSink>>);

impl Events {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self(Some(sink))
    }

    #[inline]
    pub fn emit(&self, event: PipelineEvent) {
        if let Some(sink) = &self.0 {
            sink.on_event(&event);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.0.is_some()
    }

    /// Shared handle to the attached sink, for wiring into further stages.
    pub fn sink(&self) -> Option<Arc<dyn EventSink>> {
        self.0.clone()
    }
}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Events").field(&self.is_attached()).finish()
    }
}

/// Sink that keeps every event in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events equal to `event`.
    pub fn count(&self, event: &PipelineEvent) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    /// Number of recorded events matching `pred`.
    pub fn count_matching(&self, pred: impl Fn(&PipelineEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn on_event(&self, event: &PipelineEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Sink that forwards events to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&self, event: &PipelineEvent) {
        tracing::debug!(?event, "pipeline event");
    }
}
