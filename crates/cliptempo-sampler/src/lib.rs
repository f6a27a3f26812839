//! Tempo change, gapless concatenation and clip loading.
//!
//! Builds on the pull contract from `cliptempo-core`:
//!
//! - **Time-stretching**: [`TempoStage`] adapts a block-oriented
//!   [`TempoEngine`] to pulls of any size, with upstream debounce and a
//!   single end-of-stream flush
//! - **Concatenation**: [`ConcatStage`] joins same-format clips sample-exact
//! - **Speed policy**: [`SpeedPolicy`] skips the tempo stage at unity speed
//! - **Loading**: [`ClipLoader`], with a hound-backed WAV loader behind the
//!   `wav` feature
//!
//! # Example
//!
//! ```
//! use cliptempo_core::{drain_to_vec, AudioFormat, FrameSource, MemorySource};
//! use cliptempo_sampler::{ConcatStage, SpeedPolicy};
//!
//! let format = AudioFormat::stereo(44100);
//! let clips: Vec<Box<dyn FrameSource>> = vec![
//!     Box::new(MemorySource::silence(format, 300)),
//!     Box::new(MemorySource::silence(format, 200)),
//! ];
//!
//! let joined = ConcatStage::new(clips)?;
//! let mut faster = SpeedPolicy::default().decide(Box::new(joined), 2.0)?;
//! let samples = drain_to_vec(&mut faster, 1024);
//! assert_eq!(format.frames_in(samples.len()), 250);
//! # Ok::<(), cliptempo_core::Error>(())
//! ```

// Stages
pub mod tempo;
pub use tempo::{
    TempoEngine, TempoStage, TempoState, VarispeedEngine, WindowSettings, WsolaEngine,
};

#[cfg(feature = "signalsmith")]
pub use tempo::SignalsmithEngine;

mod concat;
pub use concat::ConcatStage;

// Policy
pub mod speed;
pub use speed::{EngineFactory, RateDecision, SpeedPolicy};

// Loading
mod loader;
pub use loader::ClipLoader;

#[cfg(feature = "wav")]
pub use loader::WavClipLoader;
