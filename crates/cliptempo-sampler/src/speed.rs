//! Playback speed policy.
//!
//! Decides whether a clip needs a [`TempoStage`] at all. Unity speed (within
//! [`SPEED_EPSILON`]) returns the source untouched, so the common case costs
//! nothing at playback time.

use std::fmt;
use std::sync::Arc;

use cliptempo_core::{EventSink, Events, FrameSource, PipelineConfig, Result};
use tracing::debug;

use crate::tempo::{TempoEngine, TempoStage, VarispeedEngine, WsolaEngine};

/// Speeds closer than this to 1.0 are treated as unity.
pub const SPEED_EPSILON: f32 = 0.001;

/// Slowest supported speed.
pub const MIN_SPEED: f32 = 0.1;

/// Fastest supported speed.
pub const MAX_SPEED: f32 = 5.0;

/// Preset speeds offered to users.
pub const RECOMMENDED_SPEEDS: [f32; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// Outcome of the speed decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateDecision {
    /// Play the source as is.
    PassThrough,
    /// Insert a tempo stage with this ratio.
    Stretch(f32),
}

/// Classify a speed without building anything.
pub fn classify(speed: f32) -> RateDecision {
    if requires_change(speed) {
        RateDecision::Stretch(speed)
    } else {
        RateDecision::PassThrough
    }
}

/// Whether `speed` differs from unity by at least [`SPEED_EPSILON`].
#[inline]
pub fn requires_change(speed: f32) -> bool {
    !((speed - 1.0).abs() < SPEED_EPSILON)
}

/// Whether `speed` lies within `[MIN_SPEED, MAX_SPEED]`.
#[inline]
pub fn is_valid(speed: f32) -> bool {
    (MIN_SPEED..=MAX_SPEED).contains(&speed)
}

/// Limit `speed` to `[MIN_SPEED, MAX_SPEED]`. NaN is passed through.
#[inline]
pub fn clamp(speed: f32) -> f32 {
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

/// Display form with one decimal, e.g. `"1.5x"`.
pub fn format_speed(speed: f32) -> String {
    format!("{:.1}x", speed)
}

/// Creates a fresh engine for every tempo stage.
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Box<dyn TempoEngine>;
}

impl<F> EngineFactory for F
where
    F: Fn() -> Box<dyn TempoEngine> + Send + Sync,
{
    fn create(&self) -> Box<dyn TempoEngine> {
        self()
    }
}

/// Wraps sources in a tempo stage when their speed calls for one.
#[derive(Clone)]
pub struct SpeedPolicy {
    factory: Arc<dyn EngineFactory>,
    config: PipelineConfig,
    events: Events,
}

impl SpeedPolicy {
    pub fn new(factory: impl EngineFactory + 'static) -> Self {
        Self {
            factory: Arc::new(factory),
            config: PipelineConfig::default(),
            events: Events::none(),
        }
    }

    /// Policy using [`WsolaEngine`] (pitch is kept). This is the default.
    pub fn wsola() -> Self {
        Self::new(|| Box::new(WsolaEngine::new()) as Box<dyn TempoEngine>)
    }

    /// Policy using [`VarispeedEngine`] (pitch follows speed).
    pub fn varispeed() -> Self {
        Self::new(|| Box::new(VarispeedEngine::new()) as Box<dyn TempoEngine>)
    }

    /// Policy using the pitch-preserving signalsmith engine.
    #[cfg(feature = "signalsmith")]
    pub fn signalsmith() -> Self {
        Self::new(|| Box::new(crate::tempo::SignalsmithEngine::new()) as Box<dyn TempoEngine>)
    }

    /// Config handed to every tempo stage this policy builds.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach an event sink to every tempo stage this policy builds.
    pub fn events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Events::new(sink);
        self
    }

    /// Return `source` unchanged at unity speed, otherwise wrapped in a
    /// [`TempoStage`] running at the clamped speed.
    pub fn decide(
        &self,
        source: Box<dyn FrameSource>,
        speed: f32,
    ) -> Result<Box<dyn FrameSource>> {
        let speed = clamp(speed);
        match classify(speed) {
            RateDecision::PassThrough => {
                debug!(speed, "unity speed, no tempo stage");
                Ok(source)
            }
            RateDecision::Stretch(tempo) => {
                debug!(tempo, "inserting tempo stage");
                let mut stage =
                    TempoStage::with_config(source, tempo, self.factory.create(), self.config)?;
                if let Some(sink) = self.events.sink() {
                    stage = stage.with_events(sink);
                }
                Ok(Box::new(stage))
            }
        }
    }
}

impl Default for SpeedPolicy {
    fn default() -> Self {
        Self::wsola()
    }
}

impl fmt::Debug for SpeedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeedPolicy")
            .field("config", &self.config)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
