//! The pull contract shared by every stage.

use crate::format::AudioFormat;

/// Producer of interleaved `f32` frames at a fixed format.
///
/// `read` fills a prefix of `out` and returns the number of samples written.
/// Well-behaved sources write whole frames; consumers that need whole frames
/// (such as the tempo stage) truncate anything else. A return of 0 means the
/// source has nothing to give right now, which for finite sources is
/// end-of-stream.
///
/// Sources are pulled from a single thread; they are `Send` so a finished
/// chain can be moved onto an audio callback thread.
pub trait FrameSource: Send {
    fn format(&self) -> AudioFormat;

    fn read(&mut self, out: &mut [f32]) -> usize;
}

/// Allow boxed sources to be used as sources (for dynamic dispatch)
impl FrameSource for Box<dyn FrameSource> {
    fn format(&self) -> AudioFormat {
        (**self).format()
    }

    fn read(&mut self, out: &mut [f32]) -> usize {
        (**self).read(out)
    }
}

/// Pull `source` until it returns 0, collecting everything it produced.
///
/// Each pull requests `block_frames` frames. Intended for offline rendering
/// of short clips; live playback should pull from the output callback instead.
pub fn drain_to_vec<S: FrameSource + ?Sized>(source: &mut S, block_frames: usize) -> Vec<f32> {
    let block = source.format().samples_in(block_frames.max(1));
    let mut scratch = vec![0.0; block];
    let mut collected = Vec::new();
    loop {
        let n = source.read(&mut scratch);
        if n == 0 {
            break;
        }
        collected.extend_from_slice(&scratch[..n]);
    }
    collected
}
