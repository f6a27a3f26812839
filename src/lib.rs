//! # cliptempo - gapless sound-effect playback with time-stretching
//!
//! Plays short clips back to back at an adjustable speed through a chain of
//! pull-based stages.
//!
//! ## Architecture
//!
//! - **cliptempo-core** - Pull contract, formats, staging buffers, config, events
//! - **cliptempo-sampler** - Tempo stage and engines, concatenation, speed policy,
//!   clip loading
//!
//! ```text
//!  clip ─┐
//!  clip ─┼─> ConcatStage ─> TempoStage (speed != 1.0) ─> caller pulls
//!  clip ─┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use cliptempo::prelude::*;
//!
//! let mut chain = ClipChain::from_paths(
//!     &WavClipLoader::new(),
//!     ["sounds/3.wav", "sounds/hit.wav", "sounds/7.wav"],
//! )?
//! .speed(1.5)
//! .build()?;
//!
//! let mut block = vec![0.0f32; 4096];
//! loop {
//!     let n = chain.read(&mut block);
//!     if n == 0 {
//!         break;
//!     }
//!     // hand block[..n] to the output device
//! }
//! # Ok::<(), cliptempo::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `wav` (default) - WAV clip loading via hound
//! - `signalsmith` - Pitch-preserving engine backed by signalsmith-stretch

/// Re-export of cliptempo-core for direct access
pub use cliptempo_core as core;

/// Re-export of cliptempo-sampler for direct access
pub use cliptempo_sampler as sampler;

pub use cliptempo_core::{
    drain_to_vec,
    AudioFormat,
    // Error
    Error,
    EventSink,
    FrameBuffer,
    FrameSource,
    MemorySource,
    PipelineConfig,
    // Events
    PipelineEvent,
    PushbackSource,
    RecordingSink,
    Result,
    TracingSink,
};

pub use cliptempo_sampler::{
    ClipLoader, ConcatStage, EngineFactory, SpeedPolicy, TempoEngine, TempoStage, TempoState,
    VarispeedEngine, WsolaEngine,
};

#[cfg(feature = "wav")]
pub use cliptempo_sampler::WavClipLoader;

#[cfg(feature = "signalsmith")]
pub use cliptempo_sampler::SignalsmithEngine;

mod builder;
pub use builder::ClipChain;

/// Everything needed to build and pull a chain.
pub mod prelude {
    pub use crate::builder::ClipChain;
    pub use crate::core::{
        drain_to_vec, AudioFormat, Error, EventSink, FrameSource, MemorySource, PipelineConfig,
        PipelineEvent, RecordingSink, Result,
    };
    pub use crate::sampler::speed::{format_speed, RECOMMENDED_SPEEDS};
    pub use crate::sampler::{ClipLoader, SpeedPolicy, VarispeedEngine, WsolaEngine};

    #[cfg(feature = "wav")]
    pub use crate::sampler::WavClipLoader;

    #[cfg(feature = "signalsmith")]
    pub use crate::sampler::SignalsmithEngine;
}
