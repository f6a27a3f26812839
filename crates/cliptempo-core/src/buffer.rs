//! Fixed-capacity interleaved staging buffer.
//!
//! Unread samples always occupy `[offset, count)` with
//! `offset <= count <= capacity`. Capacity is a whole number of frames, and
//! drains move whole frames only, so a frame is never split across two reads.
//! All storage is allocated at construction.

/// Interleaved staging buffer with a read cursor.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    data: Vec<f32>,
    channels: usize,
    offset: usize,
    count: usize,
}

impl FrameBuffer {
    /// Allocate room for `frames` frames of `channels` interleaved samples.
    pub fn new(channels: usize, frames: usize) -> Self {
        let channels = channels.max(1);
        Self {
            data: vec![0.0; channels * frames.max(1)],
            channels,
            offset: 0,
            count: 0,
        }
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Capacity in samples.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Capacity in frames.
    #[inline]
    pub fn capacity_frames(&self) -> usize {
        self.data.len() / self.channels
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Unread samples remaining.
    #[inline]
    pub fn available(&self) -> usize {
        self.count - self.offset
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.count
    }

    /// The unread region `[offset, count)`.
    #[inline]
    pub fn unread(&self) -> &[f32] {
        &self.data[self.offset..self.count]
    }

    /// Discard all contents and reset the cursor.
    pub fn clear(&mut self) {
        self.offset = 0;
        self.count = 0;
    }

    /// Replace the contents with whatever `fill` writes into the full storage.
    ///
    /// `fill` returns the number of samples it wrote; the value is clamped to
    /// the capacity. The cursor is reset to 0. Returns the new `count`.
    pub fn refill<F>(&mut self, fill: F) -> usize
    where
        F: FnOnce(&mut [f32]) -> usize,
    {
        let written = fill(&mut self.data);
        self.offset = 0;
        self.count = written.min(self.data.len());
        self.count
    }

    /// Drop a trailing partial frame from the unread region.
    ///
    /// Returns the number of samples discarded (0 when already aligned).
    pub fn truncate_to_frames(&mut self) -> usize {
        let partial = self.available() % self.channels;
        self.count -= partial;
        partial
    }

    /// Copy as many whole frames as fit from the unread region into `out`.
    ///
    /// Advances the cursor and returns the number of samples copied.
    pub fn drain_into(&mut self, out: &mut [f32]) -> usize {
        let limit = out.len().min(self.available());
        let n = limit - limit % self.channels;
        out[..n].copy_from_slice(&self.data[self.offset..self.offset + n]);
        self.offset += n;
        n
    }
}
