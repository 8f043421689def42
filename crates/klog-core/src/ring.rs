//! Ring buffer store
//!
//! Fixed-capacity circular array of records. Writes never fail: once the
//! ring is full, each write replaces the oldest retained record. Eviction is
//! visible only through the wrap counter, never as a drop.
//!
//! The ring is plain data; the engine owns the lock that serializes access
//! to it, so every method here runs inside one critical section.

use crate::record::LogRecord;

/// Outcome of storing one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pushed {
    /// Sequence number assigned to the record
    pub seq: u64,
    /// The cursor returned to slot 0 with this write
    pub wrapped: bool,
}

/// Circular store of `N` records with global sequencing.
pub struct RingBuffer<const N: usize> {
    slots: [LogRecord; N],
    /// Next slot to write
    cursor: usize,
    /// Retained records, saturating at `N`
    valid: usize,
    /// Cursor returns to 0 since start or last clear
    wraps: u64,
    /// Last sequence number handed out; survives `clear`
    last_seq: u64,
}

impl<const N: usize> RingBuffer<N> {
    const NONZERO_CAPACITY: () = assert!(N > 0, "ring capacity must be non-zero");

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_CAPACITY;
        Self {
            slots: [LogRecord::EMPTY; N],
            cursor: 0,
            valid: 0,
            wraps: 0,
            last_seq: 0,
        }
    }

    /// Store `record` at the cursor, assigning the next sequence number.
    pub fn push(&mut self, mut record: LogRecord) -> Pushed {
        debug_assert!(self.cursor < N, "ring cursor out of range");

        self.last_seq += 1;
        record.seq = self.last_seq;
        self.slots[self.cursor] = record;

        self.cursor = (self.cursor + 1) % N;
        let wrapped = self.cursor == 0;
        if wrapped {
            self.wraps += 1;
        }
        if self.valid < N {
            self.valid += 1;
        }

        Pushed {
            seq: self.last_seq,
            wrapped,
        }
    }

    /// Retained records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> + '_ {
        let start = self.oldest_index();
        (0..self.valid).map(move |i| &self.slots[(start + i) % N])
    }

    /// Copy up to `max` retained records, oldest first, into `out`.
    ///
    /// Non-destructive; returns the number copied.
    pub fn read_batch(&self, out: &mut [LogRecord], max: usize) -> usize {
        let mut copied = 0;
        for (dst, src) in out.iter_mut().take(max).zip(self.iter()) {
            *dst = *src;
            copied += 1;
        }
        copied
    }

    /// Forget every retained record. Sequence numbering continues.
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.valid = 0;
        self.wraps = 0;
    }

    pub fn len(&self) -> usize {
        self.valid
    }

    pub fn is_empty(&self) -> bool {
        self.valid == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn wraps(&self) -> u64 {
        self.wraps
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    fn oldest_index(&self) -> usize {
        (self.cursor + N - self.valid) % N
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::FixedStr;

    fn rec(tag: &str) -> LogRecord {
        LogRecord {
            message: FixedStr::from_str_truncated(tag),
            ..LogRecord::EMPTY
        }
    }

    fn seqs<const N: usize>(ring: &RingBuffer<N>) -> [u64; 8] {
        let mut out = [0u64; 8];
        for (slot, r) in out.iter_mut().zip(ring.iter()) {
            *slot = r.seq;
        }
        out
    }

    #[test]
    fn test_ring_creation() {
        let ring = RingBuffer::<4>::new();
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.cursor(), 0);
        assert_eq!(ring.last_seq(), 0);
    }

    #[test]
    fn test_push_assigns_sequences_from_one() {
        let mut ring = RingBuffer::<4>::new();
        assert_eq!(ring.push(rec("a")).seq, 1);
        assert_eq!(ring.push(rec("b")).seq, 2);
        assert_eq!(ring.len(), 2);
        assert_eq!(seqs(&ring)[..2], [1, 2]);
    }

    #[test]
    fn test_overwrite_oldest_after_wrap() {
        let mut ring = RingBuffer::<4>::new();
        let outcomes: [Pushed; 6] = core::array::from_fn(|_| ring.push(rec("x")));

        assert!(outcomes[3].wrapped);
        assert!(!outcomes[4].wrapped);
        assert_eq!(ring.wraps(), 1);
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.cursor(), 2);
        assert_eq!(seqs(&ring)[..4], [3, 4, 5, 6]);
    }

    #[test]
    fn test_read_batch_limits_and_order() {
        let mut ring = RingBuffer::<4>::new();
        for _ in 0..6 {
            ring.push(rec("x"));
        }
        let mut out = [LogRecord::EMPTY; 10];

        assert_eq!(ring.read_batch(&mut out, 10), 4);
        assert_eq!(
            [out[0].seq, out[1].seq, out[2].seq, out[3].seq],
            [3, 4, 5, 6]
        );

        let mut small = [LogRecord::EMPTY; 2];
        assert_eq!(ring.read_batch(&mut small, 10), 2);
        assert_eq!([small[0].seq, small[1].seq], [3, 4]);

        assert_eq!(ring.read_batch(&mut out, 1), 1);
        assert_eq!(out[0].seq, 3);
    }

    #[test]
    fn test_clear_keeps_sequence_running() {
        let mut ring = RingBuffer::<2>::new();
        ring.push(rec("a"));
        ring.push(rec("b"));
        ring.push(rec("c"));
        ring.clear();

        assert!(ring.is_empty());
        assert_eq!(ring.cursor(), 0);
        assert_eq!(ring.wraps(), 0);
        assert_eq!(ring.iter().count(), 0);
        assert_eq!(ring.push(rec("d")).seq, 4);
    }

    #[test]
    fn test_capacity_one() {
        let mut ring = RingBuffer::<1>::new();
        assert!(ring.push(rec("a")).wrapped);
        assert!(ring.push(rec("b")).wrapped);
        assert_eq!(ring.wraps(), 2);
        assert_eq!(ring.iter().next().map(|r| r.message.as_str()), Some("b"));
    }
}
