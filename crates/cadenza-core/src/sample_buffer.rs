//! Fixed-capacity circular sample store.
//!
//! [`SampleBuffer`] is the per-session staging area between the transport layer
//! and the effect pipeline. It never reallocates after construction and never
//! overwrites unread data: a write that does not fit is truncated to the free
//! space and the shortfall is reported through the returned count.
//!
//! # Overflow policy
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | `write` of N with F free, N <= F | all N stored, returns N |
//! | `write` of N with F free, N > F | first F stored, returns F |
//! | `read` of N with A available, N <= A | N returned |
//! | `read` of N with A available, N > A | A returned, buffer empty |
//!
//! Neither case is an error. Callers inspect the returned count.

/// Point-in-time view of a [`SampleBuffer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferStatus {
    /// Total slots.
    pub capacity: usize,
    /// Unread samples.
    pub available: usize,
    /// `available / capacity`.
    pub utilization: f32,
    /// Next slot to read.
    pub read_pos: usize,
    /// Next slot to write.
    pub write_pos: usize,
    /// Samples accepted since creation or the last clear.
    pub total_written: u64,
    /// Samples consumed since creation or the last clear.
    pub total_read: u64,
    /// Sample rate of the buffered audio.
    pub sample_rate: u32,
    /// Seconds of audio currently available.
    pub duration_seconds: f64,
}

/// Fixed-capacity circular buffer of `f32` samples.
///
/// Positions wrap modulo the capacity and `0 <= available <= capacity` holds
/// after every call.
///
/// # Example
///
/// ```rust
/// use cadenza_core::SampleBuffer;
///
/// let mut buffer = SampleBuffer::new(4, 44100);
/// assert_eq!(buffer.write(&[0.1, 0.2, 0.3, 0.4, 0.5]), 4);
/// assert_eq!(buffer.read(2), vec![0.1, 0.2]);
/// assert_eq!(buffer.write(&[0.6, 0.7, 0.8]), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    storage: Vec<f32>,
    read_pos: usize,
    write_pos: usize,
    available: usize,
    sample_rate: u32,
    total_written: u64,
    total_read: u64,
}

impl SampleBuffer {
    /// Creates an empty buffer holding at most `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize, sample_rate: u32) -> Self {
        assert!(capacity > 0, "SampleBuffer capacity must be > 0");

        Self {
            storage: vec![0.0; capacity],
            read_pos: 0,
            write_pos: 0,
            available: 0,
            sample_rate,
            total_written: 0,
            total_read: 0,
        }
    }

    /// Creates a buffer sized to hold `seconds` of audio at `sample_rate`.
    pub fn from_duration(sample_rate: u32, seconds: f32) -> Self {
        let capacity = ((sample_rate as f32 * seconds) as usize).max(1);
        Self::new(capacity, sample_rate)
    }

    /// Stores as many of `samples` as fit and returns how many were stored.
    pub fn write(&mut self, samples: &[f32]) -> usize {
        let count = samples.len().min(self.free_space());
        if count < samples.len() {
            tracing::debug!(
                requested = samples.len(),
                written = count,
                capacity = self.capacity(),
                "sample buffer short write"
            );
        }
        if count == 0 {
            return 0;
        }

        let capacity = self.capacity();
        let first = count.min(capacity - self.write_pos);
        self.storage[self.write_pos..self.write_pos + first].copy_from_slice(&samples[..first]);
        let rest = count - first;
        if rest > 0 {
            self.storage[..rest].copy_from_slice(&samples[first..count]);
        }

        self.write_pos = (self.write_pos + count) % capacity;
        self.available += count;
        self.total_written += count as u64;
        count
    }

    /// Removes and returns up to `max_count` samples in FIFO order.
    pub fn read(&mut self, max_count: usize) -> Vec<f32> {
        let out = self.peek(max_count);
        self.consume(out.len());
        out
    }

    /// Like [`read`](Self::read), but multiplies every returned sample by `amplitude`.
    pub fn read_scaled(&mut self, max_count: usize, amplitude: f32) -> Vec<f32> {
        let mut out = self.read(max_count);
        if amplitude != 1.0 {
            for sample in &mut out {
                *sample *= amplitude;
            }
        }
        out
    }

    /// Removes and returns every available sample.
    pub fn drain(&mut self) -> Vec<f32> {
        self.read(self.available)
    }

    /// Copies up to `max_count` samples without consuming them.
    pub fn peek(&self, max_count: usize) -> Vec<f32> {
        let count = max_count.min(self.available);
        let mut out = Vec::with_capacity(count);

        let capacity = self.capacity();
        let first = count.min(capacity - self.read_pos);
        out.extend_from_slice(&self.storage[self.read_pos..self.read_pos + first]);
        out.extend_from_slice(&self.storage[..count - first]);
        out
    }

    /// Drops up to `max_count` unread samples without copying them.
    ///
    /// Returns how many were dropped. Pairs with [`peek`](Self::peek) when the
    /// caller only commits the read after downstream work succeeds.
    pub fn discard(&mut self, max_count: usize) -> usize {
        let count = max_count.min(self.available);
        self.consume(count);
        count
    }

    fn consume(&mut self, count: usize) {
        debug_assert!(count <= self.available);
        self.read_pos = (self.read_pos + count) % self.capacity();
        self.available -= count;
        self.total_read += count as u64;
    }

    /// Discards all unread samples and resets positions and counters.
    pub fn clear(&mut self) {
        self.storage.fill(0.0);
        self.read_pos = 0;
        self.write_pos = 0;
        self.available = 0;
        self.total_written = 0;
        self.total_read = 0;
    }

    /// Total number of sample slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of unread samples.
    #[inline]
    pub fn available(&self) -> usize {
        self.available
    }

    /// Slots that can be written before the buffer is full.
    #[inline]
    pub fn free_space(&self) -> usize {
        self.capacity() - self.available
    }

    /// Returns `true` when no further samples can be written.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.available == self.capacity()
    }

    /// Returns `true` when there is nothing to read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    /// Fraction of capacity currently holding unread samples.
    #[inline]
    pub fn utilization(&self) -> f32 {
        self.available as f32 / self.capacity() as f32
    }

    /// Sample rate the buffered audio is interpreted at.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Snapshot of the buffer's counters.
    pub fn status(&self) -> BufferStatus {
        BufferStatus {
            capacity: self.capacity(),
            available: self.available,
            utilization: self.utilization(),
            read_pos: self.read_pos,
            write_pos: self.write_pos,
            total_written: self.total_written,
            total_read: self.total_read,
            sample_rate: self.sample_rate,
            duration_seconds: self.available as f64 / f64::from(self.sample_rate.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_fifo() {
        let mut buffer = SampleBuffer::new(8, 44100);
        assert_eq!(buffer.write(&[1.0, 2.0, 3.0]), 3);
        assert_eq!(buffer.available(), 3);
        assert_eq!(buffer.read(2), vec![1.0, 2.0]);
        assert_eq!(buffer.read(10), vec![3.0]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_write_when_full() {
        let mut buffer = SampleBuffer::new(100, 44100);
        let block = vec![0.5; 100];
        assert_eq!(buffer.write(&block), 100);
        assert!(buffer.is_full());

        // Full buffer rejects everything, nothing is overwritten.
        assert_eq!(buffer.write(&[0.9; 100]), 0);
        assert_eq!(buffer.peek(1), vec![0.5]);

        // Reading K frees exactly K slots.
        let _ = buffer.read(30);
        assert_eq!(buffer.free_space(), 30);
        assert_eq!(buffer.write(&[0.9; 100]), 30);
        assert!(buffer.is_full());
    }

    #[test]
    fn test_wraparound_preserves_order() {
        let mut buffer = SampleBuffer::new(4, 44100);
        buffer.write(&[1.0, 2.0, 3.0]);
        assert_eq!(buffer.read(2), vec![1.0, 2.0]);
        assert_eq!(buffer.write(&[4.0, 5.0, 6.0]), 3);
        assert_eq!(buffer.status().write_pos, 2);
        assert_eq!(buffer.drain(), vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(buffer.status().read_pos, 2);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut buffer = SampleBuffer::new(4, 44100);
        buffer.write(&[0.25, 0.5]);
        assert_eq!(buffer.peek(8), vec![0.25, 0.5]);
        assert_eq!(buffer.available(), 2);
    }

    #[test]
    fn test_discard_skips_without_copy() {
        let mut buffer = SampleBuffer::new(4, 44100);
        buffer.write(&[1.0, 2.0, 3.0]);
        assert_eq!(buffer.discard(2), 2);
        assert_eq!(buffer.status().total_read, 2);
        assert_eq!(buffer.discard(9), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_read_scaled() {
        let mut buffer = SampleBuffer::new(4, 44100);
        buffer.write(&[0.5, -0.5]);
        assert_eq!(buffer.read_scaled(2, 0.5), vec![0.25, -0.25]);
    }

    #[test]
    fn test_status_counters() {
        let mut buffer = SampleBuffer::new(10, 10);
        buffer.write(&[0.0; 5]);
        let _ = buffer.read(2);
        let status = buffer.status();
        assert_eq!(status.capacity, 10);
        assert_eq!(status.available, 3);
        assert_eq!(status.total_written, 5);
        assert_eq!(status.total_read, 2);
        assert!((status.utilization - 0.3).abs() < 1e-6);
        assert!((status.duration_seconds - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_clear_resets() {
        let mut buffer = SampleBuffer::new(4, 44100);
        buffer.write(&[1.0; 4]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.status().total_written, 0);
        assert_eq!(buffer.write(&[2.0; 4]), 4);
    }

    #[test]
    fn test_from_duration() {
        let buffer = SampleBuffer::from_duration(44100, 1.0);
        assert_eq!(buffer.capacity(), 44100);
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        let _ = SampleBuffer::new(0, 44100);
    }
}
