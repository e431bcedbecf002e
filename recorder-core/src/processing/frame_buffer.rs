use std::collections::VecDeque;

/// Bounded FIFO for captured samples, shared between a capture callback and
/// the writer loop.
///
/// Overflow drops the oldest samples, so a stalled consumer skews the
/// recording forward instead of growing without bound.
#[derive(Debug)]
pub struct FrameBuffer {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl FrameBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(1 << 20)),
            capacity,
        }
    }

    /// Append samples, discarding the oldest on overflow.
    pub fn push(&mut self, samples: &[f32]) {
        for &sample in samples {
            if self.samples.len() == self.capacity {
                self.samples.pop_front();
            }
            self.samples.push_back(sample);
        }
    }

    /// Remove and return up to `count` samples, oldest first.
    pub fn pop(&mut self, count: usize) -> Vec<f32> {
        let take = count.min(self.samples.len());
        self.samples.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop_preserves_order() {
        let mut buf = FrameBuffer::new(8);
        buf.push(&[1.0, 2.0, 3.0]);

        assert_eq!(buf.len(), 3);
        assert_eq!(buf.pop(3), vec![1.0, 2.0, 3.0]);
        assert!(buf.is_empty());
    }

    #[test]
    fn pop_more_than_available_returns_what_is_there() {
        let mut buf = FrameBuffer::new(8);
        buf.push(&[1.0, 2.0]);

        assert_eq!(buf.pop(5), vec![1.0, 2.0]);
        assert!(buf.pop(5).is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut buf = FrameBuffer::new(3);
        buf.push(&[1.0, 2.0, 3.0]);
        buf.push(&[4.0, 5.0]);

        assert_eq!(buf.len(), 3);
        assert_eq!(buf.pop(3), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn push_larger_than_capacity_keeps_tail() {
        let mut buf = FrameBuffer::new(2);
        buf.push(&[1.0, 2.0, 3.0, 4.0]);

        assert_eq!(buf.pop(2), vec![3.0, 4.0]);
    }

    #[test]
    fn clear_empties_the_buffer() {
        let mut buf = FrameBuffer::new(4);
        buf.push(&[1.0, 2.0]);
        buf.clear();

        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 4);
    }
}
