//! Clip loading.
//!
//! Loaders turn a path into a finite [`FrameSource`] carrying its own
//! [`AudioFormat`]. Clips are short sound effects, so they are decoded fully
//! into memory up front.

use std::path::Path;

use cliptempo_core::{FrameSource, Result};

/// Loads an audio clip from disk.
pub trait ClipLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Box<dyn FrameSource>>;
}

#[cfg(feature = "wav")]
pub use wav::WavClipLoader;

#[cfg(feature = "wav")]
mod wav {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use cliptempo_core::{AudioFormat, Error, FrameSource, MemorySource, Result};
    use hound::{SampleFormat, WavReader};
    use tracing::debug;

    use super::ClipLoader;

    /// Decodes WAV files (integer PCM up to 32 bit, or 32-bit float) to
    /// `f32` samples in `[-1, 1]`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct WavClipLoader;

    impl WavClipLoader {
        pub fn new() -> Self {
            Self
        }

        fn decode(reader: WavReader<BufReader<File>>) -> Result<(Vec<f32>, AudioFormat)> {
            let spec = reader.spec();
            let format = AudioFormat::new(spec.sample_rate, spec.channels)?;

            let samples = match (spec.sample_format, spec.bits_per_sample) {
                (SampleFormat::Float, 32) => reader
                    .into_samples::<f32>()
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(decode_error)?,
                (SampleFormat::Int, bits @ 1..=32) => {
                    let scale = 1.0 / (1u64 << (bits - 1)) as f32;
                    reader
                        .into_samples::<i32>()
                        .map(|s| s.map(|v| v as f32 * scale))
                        .collect::<std::result::Result<Vec<_>, _>>()
                        .map_err(decode_error)?
                }
                (fmt, bits) => {
                    return Err(Error::UnsupportedFormat(format!(
                        "{bits}-bit {fmt:?} WAV"
                    )))
                }
            };

            Ok((samples, format))
        }
    }

    impl ClipLoader for WavClipLoader {
        fn load(&self, path: &Path) -> Result<Box<dyn FrameSource>> {
            let reader = WavReader::open(path).map_err(decode_error)?;
            let (samples, format) = Self::decode(reader)?;

            let source = MemorySource::new(samples, format);
            debug!(
                path = %path.display(),
                %format,
                frames = source.len_frames(),
                "clip loaded"
            );
            Ok(Box::new(source))
        }
    }

    fn decode_error(err: hound::Error) -> Error {
        match err {
            hound::Error::IoError(e) => Error::Io(e),
            hound::Error::Unsupported => Error::UnsupportedFormat("WAV encoding".to_string()),
            other => Error::Decode(other.to_string()),
        }
    }

}
