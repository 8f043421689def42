//! Statistics tracker
//!
//! Counters are updated inside the engine's lock domain by the same
//! critical section that admits or drops a record, so a snapshot always
//! satisfies `sum(logs_by_level) == total_logs`.
//!
//! # Wire Layout
//!
//! [`STATS_WIRE_SIZE`] bytes: `total_logs`, `dropped_logs`, `buffer_wraps`,
//! then `logs_by_level[0..5]`, each a little-endian `u64`.

use serde::Serialize;

use crate::error::KlogError;
use crate::level::{LogLevel, LOG_LEVEL_COUNT};
use crate::record::le_u64;

/// Size of a stats snapshot on the wire.
pub const STATS_WIRE_SIZE: usize = 8 * (3 + LOG_LEVEL_COUNT);

/// Running counters since start or last clear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Records accepted by the gate
    pub total_logs: u64,
    /// Records rejected by the gate (eviction is not a drop)
    pub dropped_logs: u64,
    /// Times the ring cursor returned to slot 0
    pub buffer_wraps: u64,
    /// Accepted records per severity
    pub logs_by_level: [u64; LOG_LEVEL_COUNT],
}

impl Stats {
    pub const ZERO: Stats = Stats {
        total_logs: 0,
        dropped_logs: 0,
        buffer_wraps: 0,
        logs_by_level: [0; LOG_LEVEL_COUNT],
    };

    /// Account one stored record.
    pub fn record_accepted(&mut self, level: LogLevel, wrapped: bool) {
        self.total_logs += 1;
        self.logs_by_level[level.index()] += 1;
        if wrapped {
            self.buffer_wraps += 1;
        }
    }

    /// Account one gate rejection.
    pub fn record_dropped(&mut self) {
        self.dropped_logs += 1;
    }

    pub fn level_count(&self, level: LogLevel) -> u64 {
        self.logs_by_level[level.index()]
    }

    pub fn reset(&mut self) {
        *self = Stats::ZERO;
    }

    /// Serialize into exactly [`STATS_WIRE_SIZE`] bytes.
    pub fn write_wire(&self, out: &mut [u8; STATS_WIRE_SIZE]) {
        let fields = [self.total_logs, self.dropped_logs, self.buffer_wraps]
            .into_iter()
            .chain(self.logs_by_level);
        for (chunk, value) in out.chunks_exact_mut(8).zip(fields) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
    }

    pub fn from_wire(bytes: &[u8]) -> Result<Self, KlogError> {
        if bytes.len() < STATS_WIRE_SIZE {
            return Err(KlogError::BufferTooSmall {
                needed: STATS_WIRE_SIZE,
                available: bytes.len(),
            });
        }
        let mut logs_by_level = [0u64; LOG_LEVEL_COUNT];
        for (i, slot) in logs_by_level.iter_mut().enumerate() {
            *slot = le_u64(bytes, 24 + 8 * i);
        }
        Ok(Stats {
            total_logs: le_u64(bytes, 0),
            dropped_logs: le_u64(bytes, 8),
            buffer_wraps: le_u64(bytes, 16),
            logs_by_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_updates_total_and_level() {
        let mut stats = Stats::default();
        stats.record_accepted(LogLevel::Info, false);
        stats.record_accepted(LogLevel::Info, true);
        stats.record_accepted(LogLevel::Fatal, false);

        assert_eq!(stats.total_logs, 3);
        assert_eq!(stats.level_count(LogLevel::Info), 2);
        assert_eq!(stats.level_count(LogLevel::Fatal), 1);
        assert_eq!(stats.buffer_wraps, 1);
        assert_eq!(stats.dropped_logs, 0);
    }

    #[test]
    fn test_drop_does_not_touch_accepted_counters() {
        let mut stats = Stats::default();
        stats.record_dropped();
        stats.record_dropped();
        assert_eq!(stats.dropped_logs, 2);
        assert_eq!(stats.total_logs, 0);
        assert_eq!(stats.logs_by_level, [0; LOG_LEVEL_COUNT]);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut stats = Stats::default();
        stats.record_accepted(LogLevel::Error, true);
        stats.record_dropped();
        stats.reset();
        assert_eq!(stats, Stats::ZERO);
    }

    #[test]
    fn test_wire_layout() {
        let mut stats = Stats::default();
        stats.record_accepted(LogLevel::Warn, true);
        stats.record_dropped();

        let mut wire = [0u8; STATS_WIRE_SIZE];
        stats.write_wire(&mut wire);

        assert_eq!(STATS_WIRE_SIZE, 64);
        assert_eq!(wire[0], 1); // total
        assert_eq!(wire[8], 1); // dropped
        assert_eq!(wire[16], 1); // wraps
        assert_eq!(wire[24 + 8 * 2], 1); // WARN
        assert_eq!(Stats::from_wire(&wire), Ok(stats));
    }

    #[test]
    fn test_from_wire_short_buffer() {
        assert_eq!(
            Stats::from_wire(&[0u8; 10]),
            Err(KlogError::BufferTooSmall {
                needed: 64,
                available: 10
            })
        );
    }
}
