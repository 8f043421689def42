//! Runtime-checkable invariants of the log store
//!
//! These hold after every completed operation on the engine. They are
//! unreachable as runtime failures by construction; the checker exists for
//! tests, fuzzing and post-mortem diagnostics.
//!
//! # Invariants
//!
//! 1. **Cursor Range**: `cursor < N`
//! 2. **Cursor Position**: `cursor == total_logs % N` and `wraps == total_logs / N`
//! 3. **Saturation**: `valid_count == min(total_logs, N)`
//! 4. **Level Sum**: `sum(logs_by_level) == total_logs`
//! 5. **Wrap Mirror**: `stats.buffer_wraps == ring.wraps`
//! 6. **Sequence Order**: retained records carry consecutive sequence
//!    numbers ending at the last one handed out

use core::fmt;

use crate::ring::RingBuffer;
use crate::stats::Stats;

/// An invariant violation with details
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: &'static str,
    /// Value the invariant requires
    pub expected: u64,
    /// Value actually observed
    pub found: u64,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.invariant, self.expected, self.found
        )
    }
}

/// Check all store invariants, reporting the first violation.
pub fn check_all_invariants<const N: usize>(
    ring: &RingBuffer<N>,
    stats: &Stats,
) -> Result<(), InvariantViolation> {
    check_cursor_range(ring)?;
    check_cursor_position(ring, stats)?;
    check_saturation(ring, stats)?;
    check_level_sum(stats)?;
    check_wrap_mirror(ring, stats)?;
    check_sequence_order(ring)
}

fn ensure(invariant: &'static str, expected: u64, found: u64) -> Result<(), InvariantViolation> {
    if expected == found {
        Ok(())
    } else {
        Err(InvariantViolation {
            invariant,
            expected,
            found,
        })
    }
}

/// Invariant 1: the cursor indexes a real slot
fn check_cursor_range<const N: usize>(ring: &RingBuffer<N>) -> Result<(), InvariantViolation> {
    if ring.cursor() < N {
        Ok(())
    } else {
        Err(InvariantViolation {
            invariant: "cursor_range",
            expected: N as u64 - 1,
            found: ring.cursor() as u64,
        })
    }
}

/// Invariant 2: cursor and wrap count follow from the accepted total
fn check_cursor_position<const N: usize>(
    ring: &RingBuffer<N>,
    stats: &Stats,
) -> Result<(), InvariantViolation> {
    let n = N as u64;
    ensure("cursor_position", stats.total_logs % n, ring.cursor() as u64)?;
    ensure("wrap_count", stats.total_logs / n, ring.wraps())
}

/// Invariant 3: valid_count == min(total_logs, N)
fn check_saturation<const N: usize>(
    ring: &RingBuffer<N>,
    stats: &Stats,
) -> Result<(), InvariantViolation> {
    ensure(
        "valid_saturation",
        stats.total_logs.min(N as u64),
        ring.len() as u64,
    )
}

/// Invariant 4: per-level counters add up to the total
fn check_level_sum(stats: &Stats) -> Result<(), InvariantViolation> {
    ensure(
        "level_sum",
        stats.total_logs,
        stats.logs_by_level.iter().sum(),
    )
}

/// Invariant 5: stats mirror the ring's wrap counter
fn check_wrap_mirror<const N: usize>(
    ring: &RingBuffer<N>,
    stats: &Stats,
) -> Result<(), InvariantViolation> {
    ensure("wrap_mirror", ring.wraps(), stats.buffer_wraps)
}

/// Invariant 6: retained sequences are consecutive and end at last_seq
fn check_sequence_order<const N: usize>(ring: &RingBuffer<N>) -> Result<(), InvariantViolation> {
    let retained = ring.len() as u64;
    if retained == 0 {
        return Ok(());
    }
    let mut expected = ring.last_seq() + 1 - retained;
    for record in ring.iter() {
        ensure("sequence_order", expected, record.seq)?;
        expected += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;
    use crate::record::LogRecord;

    fn push<const N: usize>(ring: &mut RingBuffer<N>, stats: &mut Stats, level: LogLevel) {
        let pushed = ring.push(LogRecord {
            level,
            ..LogRecord::EMPTY
        });
        stats.record_accepted(level, pushed.wrapped);
    }

    #[test]
    fn test_fresh_store_is_consistent() {
        let ring = RingBuffer::<4>::new();
        assert_eq!(check_all_invariants(&ring, &Stats::ZERO), Ok(()));
    }

    #[test]
    fn test_holds_across_wraps_and_clear() {
        let mut ring = RingBuffer::<3>::new();
        let mut stats = Stats::default();
        for i in 0..10 {
            push(&mut ring, &mut stats, LogLevel::ALL[i % 5]);
            assert_eq!(check_all_invariants(&ring, &stats), Ok(()));
        }
        stats.record_dropped();
        assert_eq!(check_all_invariants(&ring, &stats), Ok(()));

        ring.clear();
        stats.reset();
        assert_eq!(check_all_invariants(&ring, &stats), Ok(()));
        push(&mut ring, &mut stats, LogLevel::Info);
        assert_eq!(check_all_invariants(&ring, &stats), Ok(()));
    }

    #[test]
    fn test_detects_counter_drift() {
        let mut ring = RingBuffer::<4>::new();
        let mut stats = Stats::default();
        push(&mut ring, &mut stats, LogLevel::Warn);
        stats.logs_by_level[LogLevel::Debug.index()] += 1;

        let err = check_all_invariants(&ring, &stats).unwrap_err();
        assert_eq!(err.invariant, "level_sum");
        assert_eq!(err.expected, 1);
        assert_eq!(err.found, 2);
    }

    #[test]
    fn test_detects_missing_wrap_mirror() {
        let mut ring = RingBuffer::<1>::new();
        let mut stats = Stats::default();
        push(&mut ring, &mut stats, LogLevel::Info);
        stats.buffer_wraps = 0;

        let err = check_all_invariants(&ring, &stats).unwrap_err();
        assert_eq!(err.invariant, "wrap_mirror");
    }
}
