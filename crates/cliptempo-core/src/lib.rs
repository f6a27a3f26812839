//! Pull-based frame sources for short-clip playback.
//!
//! # Primary API
//!
//! - [`FrameSource`]: the pull contract every stage implements
//! - [`AudioFormat`]: sample rate and channel count shared by a chain
//! - [`FrameBuffer`]: fixed-capacity staging buffer with a read cursor
//! - [`MemorySource`]: decoded clip held in memory
//! - [`PushbackSource`]: non-destructive one-frame lookahead
//! - [`PipelineConfig`]: iteration caps, debounce and staging sizes
//! - [`EventSink`]: optional structured lifecycle events
//!
//! # Example
//!
//! ```
//! use cliptempo_core::{drain_to_vec, AudioFormat, MemorySource};
//!
//! let format = AudioFormat::stereo(44100);
//! let mut clip = MemorySource::silence(format, 1000);
//! let samples = drain_to_vec(&mut clip, 256);
//! assert_eq!(format.frames_in(samples.len()), 1000);
//! ```

pub mod error;
pub use error::{Error, Result};

mod buffer;
pub use buffer::FrameBuffer;

mod config;
pub use config::PipelineConfig;

pub mod events;
pub use events::{EventSink, Events, PipelineEvent, RecordingSink, StageKind, TracingSink};

mod format;
pub use format::AudioFormat;

mod memory;
pub use memory::MemorySource;

mod pushback;
pub use pushback::PushbackSource;

mod source;
pub use source::{drain_to_vec, FrameSource};
