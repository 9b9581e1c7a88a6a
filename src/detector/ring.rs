//! Fixed-capacity ring buffer for the pipeline's rolling windows.
//!
//! The analysis window is rescanned in full on every sample, so the buffer is
//! an index-based circular array rather than a linked deque: the payload stays
//! in one contiguous allocation and copies out in order with two memcpys.

pub(super) struct Ring {
    buf: Vec<f64>,
    head: usize,
    len: usize,
}

impl Ring {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: vec![0.0; capacity],
            head: 0,
            len: 0,
        }
    }

    /// Append a value, evicting the oldest entry once full.
    pub(super) fn push(&mut self, value: f64) {
        self.buf[self.head] = value;
        self.head = (self.head + 1) % self.buf.len();
        if self.len < self.buf.len() {
            self.len += 1;
        }
    }

    pub(super) fn len(&self) -> usize {
        self.len
    }

    pub(super) fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub(super) fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(super) fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Arithmetic mean of the stored values; 0.0 when empty.
    pub(super) fn mean(&self) -> f64 {
        if self.len == 0 {
            return 0.0;
        }
        let (older, newer) = self.ordered_slices();
        let sum: f64 = older.iter().sum::<f64>() + newer.iter().sum::<f64>();
        sum / self.len as f64
    }

    /// Copy the contents oldest-first into `out`, replacing its contents.
    pub(super) fn copy_ordered_into(&self, out: &mut Vec<f64>) {
        out.clear();
        let (older, newer) = self.ordered_slices();
        out.extend_from_slice(older);
        out.extend_from_slice(newer);
    }

    /// The stored values as (oldest run, newest run) slices.
    fn ordered_slices(&self) -> (&[f64], &[f64]) {
        if self.len < self.buf.len() {
            // Not yet wrapped: values live in [0, len).
            (&self.buf[..self.len], &[])
        } else {
            (&self.buf[self.head..], &self.buf[..self.head])
        }
    }
}
