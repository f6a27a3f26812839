//! One-frame lookahead without losing data.

use crate::buffer::FrameBuffer;
use crate::format::AudioFormat;
use crate::source::FrameSource;

/// Wraps a source with a one-frame pushback buffer.
///
/// `peek_frame` pulls a single frame from the inner source and keeps it;
/// the next `read` hands that frame out first. Asking "is there more?" never
/// consumes anything the caller would otherwise have received.
pub struct PushbackSource<S> {
    inner: S,
    pending: FrameBuffer,
}

impl<S: FrameSource> PushbackSource<S> {
    pub fn new(inner: S) -> Self {
        let channels = inner.format().channels();
        Self {
            inner,
            pending: FrameBuffer::new(channels, 1),
        }
    }

    /// Look at the next frame without consuming it.
    ///
    /// Returns `None` when the inner source produced no whole frame.
    pub fn peek_frame(&mut self) -> Option<&[f32]> {
        if self.pending.is_empty() {
            let inner = &mut self.inner;
            self.pending.refill(|slot| inner.read(slot));
            self.pending.truncate_to_frames();
        }
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.unread())
        }
    }

    /// Whether at least one more frame is available right now.
    pub fn has_more(&mut self) -> bool {
        self.peek_frame().is_some()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the inner source, losing any pushed-back frame.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSource> FrameSource for PushbackSource<S> {
    fn format(&self) -> AudioFormat {
        self.inner.format()
    }

    fn read(&mut self, out: &mut [f32]) -> usize {
        let head = self.pending.drain_into(out);
        if head == 0 && !self.pending.is_empty() {
            // `out` is smaller than one frame
            return 0;
        }
        head + self.inner.read(&mut out[head..])
    }
}
