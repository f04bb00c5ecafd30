//! Bounded sliding window of recent mono samples
//!
//! Fixed-capacity ring with index-based head/length bookkeeping. A single
//! mutex guards both append-and-evict and snapshot reads so a reader never
//! observes a half-written chunk.

use parking_lot::Mutex;

use crate::source::Frame;

/// Ring storage, only ever touched with the lock held
struct Ring {
    data: Vec<f32>,
    /// Index of the oldest sample
    head: usize,
    /// Number of valid samples
    len: usize,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity],
            head: 0,
            len: 0,
        }
    }

    #[inline]
    fn push(&mut self, value: f32) {
        let capacity = self.data.len();
        let tail = (self.head + self.len) % capacity;
        self.data[tail] = value;
        if self.len < capacity {
            self.len += 1;
        } else {
            // Full: the write above overwrote the oldest sample
            self.head = (self.head + 1) % capacity;
        }
    }

    fn to_vec(&self) -> Vec<f32> {
        let capacity = self.data.len();
        let mut out = Vec::with_capacity(self.len);
        let first = (capacity - self.head).min(self.len);
        out.extend_from_slice(&self.data[self.head..self.head + first]);
        out.extend_from_slice(&self.data[..self.len - first]);
        out
    }
}

/// Sliding window holding at most `capacity` of the most recent samples
pub struct SlidingSampleBuffer {
    capacity: usize,
    ring: Mutex<Ring>,
}

impl SlidingSampleBuffer {
    /// Create an empty buffer holding up to `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ring: Mutex::new(Ring::new(capacity)),
        }
    }

    /// Maximum number of samples retained
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a chunk in order, evicting the oldest samples past capacity.
    ///
    /// Returns the number of samples accepted, which is always the chunk
    /// length; evicted samples still count as accepted.
    pub fn ingest(&self, chunk: &[f32]) -> usize {
        if self.capacity == 0 {
            return chunk.len();
        }

        // Only the newest `capacity` samples of an oversized chunk survive
        let start = chunk.len().saturating_sub(self.capacity);

        let mut ring = self.ring.lock();
        for &sample in &chunk[start..] {
            ring.push(sample);
        }
        chunk.len()
    }

    /// Append the first channel of each frame
    pub fn ingest_frames(&self, frames: &[Frame]) -> usize {
        if self.capacity == 0 {
            return frames.len();
        }

        let start = frames.len().saturating_sub(self.capacity);

        let mut ring = self.ring.lock();
        for frame in &frames[start..] {
            ring.push(frame[0]);
        }
        frames.len()
    }

    /// Copy of the current contents, oldest first
    pub fn snapshot(&self) -> Vec<f32> {
        if self.capacity == 0 {
            return Vec::new();
        }
        self.ring.lock().to_vec()
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        if self.capacity == 0 {
            return 0;
        }
        self.ring.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all buffered samples
    pub fn clear(&self) {
        if self.capacity == 0 {
            return;
        }
        let mut ring = self.ring.lock();
        ring.head = 0;
        ring.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_in_order() {
        let buffer = SlidingSampleBuffer::new(4);
        assert_eq!(buffer.ingest(&[1.0, 2.0, 3.0]), 3);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.snapshot(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_evicts_oldest() {
        let buffer = SlidingSampleBuffer::new(4);
        buffer.ingest(&[1.0, 2.0, 3.0]);
        buffer.ingest(&[4.0, 5.0, 6.0]);
        assert_eq!(buffer.snapshot(), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_oversized_chunk_keeps_tail() {
        let buffer = SlidingSampleBuffer::new(3);
        assert_eq!(buffer.ingest(&[1.0, 2.0, 3.0, 4.0, 5.0]), 5);
        assert_eq!(buffer.snapshot(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_empty_chunk() {
        let buffer = SlidingSampleBuffer::new(3);
        buffer.ingest(&[1.0]);
        assert_eq!(buffer.ingest(&[]), 0);
        assert_eq!(buffer.snapshot(), vec![1.0]);
    }

    #[test]
    fn test_zero_capacity_always_empty() {
        let buffer = SlidingSampleBuffer::new(0);
        assert_eq!(buffer.ingest(&[1.0, 2.0]), 2);
        assert!(buffer.is_empty());
        assert!(buffer.snapshot().is_empty());
    }

    #[test]
    fn test_frames_use_first_channel() {
        let buffer = SlidingSampleBuffer::new(8);
        buffer.ingest_frames(&[[0.25, -1.0], [0.5, -1.0]]);
        assert_eq!(buffer.snapshot(), vec![0.25, 0.5]);
    }

    #[test]
    fn test_survivors_match_most_recent() {
        // Irregular chunk sizes across several wraps
        let capacity = 7;
        let buffer = SlidingSampleBuffer::new(capacity);
        let mut all = Vec::new();
        let mut next = 0.0f32;

        for size in [0usize, 3, 5, 1, 9, 2, 7, 4, 13, 6] {
            let chunk: Vec<f32> = (0..size)
                .map(|_| {
                    next += 1.0;
                    next
                })
                .collect();
            buffer.ingest(&chunk);
            all.extend_from_slice(&chunk);

            let expected = &all[all.len().saturating_sub(capacity)..];
            let snapshot = buffer.snapshot();
            assert!(snapshot.len() <= capacity);
            assert_eq!(snapshot, expected, "after chunk of {}", size);
        }
    }

    #[test]
    fn test_clear() {
        let buffer = SlidingSampleBuffer::new(4);
        buffer.ingest(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        buffer.clear();
        assert!(buffer.is_empty());
        buffer.ingest(&[9.0]);
        assert_eq!(buffer.snapshot(), vec![9.0]);
    }
}
