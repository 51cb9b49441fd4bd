//! Growable byte buffer used to assemble protocol units before parsing.
//!
//! Bytes are appended at the tail and consumed from the head. Consumed bytes are
//! physically shifted to the front of the region, so the valid bytes always start
//! at offset zero and the framer can scan a single contiguous slice.
//!
//! Capacity grows by doubling from [`MIN_CAPACITY`] and never shrinks. Across a
//! session where the total number of appended bytes grows monotonically, growth
//! costs amortized O(1) per byte.

use std::fmt;

/// Capacity allocated on the first append
pub const MIN_CAPACITY: usize = 1024;

/// An append-at-tail, consume-from-head byte accumulator.
pub struct GrowableBuffer {
    region: Box<[u8]>,
    len: usize,
}

impl GrowableBuffer {
    /// Creates an empty buffer, no memory is allocated until the first append.
    pub fn new() -> Self {
        Self { region: Box::default(), len: 0 }
    }

    /// Creates a buffer able to hold at least `capacity` bytes without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buffer = Self::new();
        if capacity > 0 {
            buffer.grow_to(capacity);
        }
        buffer
    }

    /// Appends `bytes` at the tail, doubling the capacity as often as needed.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }

        let required = self.len + bytes.len();
        if required > self.region.len() {
            self.grow_to(required);
        }

        self.region[self.len..required].copy_from_slice(bytes);
        self.len = required;
    }

    /// Drops the first `n` bytes and shifts the rest to the front.
    ///
    /// # Panics
    ///
    /// Panics if `n` is larger than [`len`](Self::len).
    pub fn consume_front(&mut self, n: usize) {
        assert!(n <= self.len, "consume {n} bytes but only {} buffered", self.len);

        self.region.copy_within(n..self.len, 0);
        self.len -= n;
    }

    /// The valid bytes, starting at the head.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.region[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    /// Forgets all valid bytes, keeping the allocated region.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    fn grow_to(&mut self, required: usize) {
        let mut capacity = self.region.len().max(MIN_CAPACITY);
        while capacity < required {
            capacity *= 2;
        }

        if capacity == self.region.len() {
            return;
        }

        let mut region = vec![0u8; capacity].into_boxed_slice();
        region[..self.len].copy_from_slice(&self.region[..self.len]);
        self.region = region;
    }
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for GrowableBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for GrowableBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBuffer").field("len", &self.len).field("capacity", &self.region.len()).finish()
    }
}
