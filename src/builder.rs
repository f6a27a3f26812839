//! Builder composing a playable chain of clips.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::core::{Error, EventSink, FrameSource, PipelineConfig, Result};
use crate::sampler::{ClipLoader, ConcatStage, EngineFactory, SpeedPolicy};

/// Clips played back to back at one speed.
///
/// A single clip is used as is; several are joined with a [`ConcatStage`].
/// The result then goes through [`SpeedPolicy::decide`], so unity speed adds
/// no tempo stage.
///
/// # Example
///
/// ```
/// use cliptempo::prelude::*;
///
/// let format = AudioFormat::stereo(44100);
/// let mut chain = ClipChain::new()
///     .clip(MemorySource::silence(format, 400))
///     .clip(MemorySource::silence(format, 100))
///     .speed(1.25)
///     .build()?;
///
/// let samples = drain_to_vec(&mut chain, 512);
/// assert_eq!(format.frames_in(samples.len()), 400);
/// # Ok::<(), cliptempo::Error>(())
/// ```
pub struct ClipChain {
    clips: Vec<Box<dyn FrameSource>>,
    speed: f32,
    config: PipelineConfig,
    events: Option<Arc<dyn EventSink>>,
    policy: SpeedPolicy,
}

impl Default for ClipChain {
    fn default() -> Self {
        Self {
            clips: Vec::new(),
            speed: 1.0,
            config: PipelineConfig::default(),
            events: None,
            policy: SpeedPolicy::default(),
        }
    }
}

impl ClipChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every path through `loader`, in order.
    pub fn from_paths<P: AsRef<Path>>(
        loader: &dyn ClipLoader,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<Self> {
        let mut chain = Self::new();
        for path in paths {
            chain.clips.push(loader.load(path.as_ref())?);
        }
        Ok(chain)
    }

    /// Append one clip.
    pub fn clip(mut self, source: impl FrameSource + 'static) -> Self {
        self.clips.push(Box::new(source));
        self
    }

    /// Append already boxed clips.
    pub fn clips(mut self, sources: impl IntoIterator<Item = Box<dyn FrameSource>>) -> Self {
        self.clips.extend(sources);
        self
    }

    /// Playback speed; clamped to the supported range at build time.
    /// Default: 1.0
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sink attached to every stage in the chain.
    pub fn events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Engine used when a tempo stage is needed.
    /// Default: [`WsolaEngine`](crate::sampler::WsolaEngine), which keeps pitch
    pub fn engine(mut self, factory: impl EngineFactory + 'static) -> Self {
        self.policy = SpeedPolicy::new(factory);
        self
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Compose the chain. Fails on no clips, mismatched formats or an
    /// invalid config.
    pub fn build(self) -> Result<Box<dyn FrameSource>> {
        let Self {
            mut clips,
            speed,
            config,
            events,
            policy,
        } = self;

        config.validate()?;
        debug!(clips = clips.len(), speed, "building clip chain");

        let joined: Box<dyn FrameSource> = match clips.len() {
            0 => return Err(Error::NoSources),
            1 => clips.remove(0),
            _ => {
                let mut stage = ConcatStage::with_config(clips, config)?;
                if let Some(sink) = &events {
                    stage = stage.with_events(Arc::clone(sink));
                }
                Box::new(stage)
            }
        };

        let mut policy = policy.config(config);
        if let Some(sink) = events {
            policy = policy.events(sink);
        }
        policy.decide(joined, speed)
    }
}
