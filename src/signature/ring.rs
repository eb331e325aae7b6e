//! Fixed-capacity circular stores used by the signature pipeline.
//!
//! One ring holds raw samples (capacity 2048), two more hold the last 256
//! power spectra and spread spectra. A ring is storage plus a write cursor
//! plus a never-reset written counter; slots start at a caller-supplied fill
//! value so reads behind the cursor are well-defined before wrap-around.

/// Circular buffer with an explicit cursor and total-written count.
#[derive(Debug, Clone)]
pub struct Ring<T> {
    slots: Vec<T>,
    cursor: usize,
    total_written: u64,
}

impl<T: Clone> Ring<T> {
    /// Create a ring of `capacity` slots, all initialized to `fill`.
    pub fn new(capacity: usize, fill: T) -> Self {
        assert!(capacity > 0, "ring capacity must be non-zero");
        Self {
            slots: vec![fill; capacity],
            cursor: 0,
            total_written: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of values written over the ring's lifetime.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Overwrite the slot at the cursor and advance.
    pub fn push(&mut self, value: T) {
        self.cursor = self.write_at_cursor(value);
    }

    /// Append a block of values at the cursor, wrapping as needed.
    ///
    /// The block is assumed to be no longer than the ring itself.
    pub fn extend_from_slice(&mut self, block: &[T]) {
        for value in block {
            self.push(value.clone());
        }
    }

    /// Read the slot `offset` positions from the cursor.
    ///
    /// Offsets are taken modulo capacity, so `-1` is the most recently
    /// written slot and positive offsets wrap forward across the ring.
    pub fn at_offset(&self, offset: isize) -> &T {
        &self.slots[self.index_of(offset)]
    }

    pub fn at_offset_mut(&mut self, offset: isize) -> &mut T {
        let index = self.index_of(offset);
        &mut self.slots[index]
    }

    /// The ring contents in time order, oldest slot first.
    ///
    /// Starts at the cursor (the oldest value once the ring has wrapped;
    /// the fill value before that) and wraps around the storage.
    pub fn snapshot_timeordered(&self) -> Vec<T> {
        let capacity = self.capacity();
        let mut ordered = Vec::with_capacity(capacity);
        for i in 0..capacity {
            ordered.push(self.slots[(self.cursor + i) % capacity].clone());
        }
        ordered
    }

    fn write_at_cursor(&mut self, value: T) -> usize {
        self.slots[self.cursor] = value;
        self.total_written += 1;
        (self.cursor + 1) % self.capacity()
    }

    fn index_of(&self, offset: isize) -> usize {
        let capacity = self.capacity() as isize;
        (self.cursor as isize + offset).rem_euclid(capacity) as usize
    }
}
