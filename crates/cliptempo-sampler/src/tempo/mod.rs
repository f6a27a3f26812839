//! Tempo change for clip playback.
//!
//! [`TempoStage`] turns any block-oriented [`TempoEngine`] into a
//! [`FrameSource`](cliptempo_core::FrameSource) that can be pulled in blocks
//! of any size, handling the debounce of upstream gaps and the one-time
//! engine flush at end of input.
//!
//! # Example
//!
//! ```
//! use cliptempo_core::{drain_to_vec, AudioFormat, MemorySource};
//! use cliptempo_sampler::tempo::{TempoStage, VarispeedEngine};
//!
//! let format = AudioFormat::stereo(44100);
//! let clip = MemorySource::silence(format, 1000);
//!
//! let mut faster = TempoStage::new(Box::new(clip), 2.0, VarispeedEngine::new())?;
//! let samples = drain_to_vec(&mut faster, 512);
//! assert_eq!(format.frames_in(samples.len()), 500);
//! # Ok::<(), cliptempo_core::Error>(())
//! ```
//!
//! # Engines
//!
//! - [`WsolaEngine`]: pitch-preserving overlap-add driven by
//!   [`WindowSettings`] (the default)
//! - [`VarispeedEngine`]: resampling, pitch follows speed
//! - `SignalsmithEngine` (feature `signalsmith`): pitch-preserving stretch
//!   with preset windows

mod engine;
mod stage;
mod varispeed;
mod wsola;

#[cfg(feature = "signalsmith")]
mod signalsmith;

pub use engine::{TempoEngine, WindowSettings};
pub use stage::{TempoStage, TempoState};
pub use varispeed::VarispeedEngine;
pub use wsola::WsolaEngine;

#[cfg(feature = "signalsmith")]
pub use signalsmith::SignalsmithEngine;
