//! Admission gate
//!
//! The gate decides whether a freshly encoded record is stored at all. It
//! lives inside the engine's lock domain together with the ring, so a write
//! and a gate change never interleave; the gate itself is plain data.

use crate::config::KlogConfig;
use crate::level::LogLevel;

/// Global enable flag plus minimum severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    enabled: bool,
    min_level: LogLevel,
}

impl Gate {
    pub const fn new(config: KlogConfig) -> Self {
        Self {
            enabled: config.enabled,
            min_level: config.min_level,
        }
    }

    /// `false` iff logging is disabled or `level` is below the threshold.
    #[inline]
    pub fn accept(&self, level: LogLevel) -> bool {
        self.enabled && level >= self.min_level
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn level(&self) -> LogLevel {
        self.min_level
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(KlogConfig::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accepts_everything() {
        let gate = Gate::default();
        for level in LogLevel::ALL {
            assert!(gate.accept(level));
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut gate = Gate::default();
        gate.set_level(LogLevel::Warn);
        assert!(!gate.accept(LogLevel::Info));
        assert!(gate.accept(LogLevel::Warn));
        assert!(gate.accept(LogLevel::Fatal));
        assert_eq!(gate.level(), LogLevel::Warn);
    }

    #[test]
    fn test_disable_rejects_even_fatal() {
        let mut gate = Gate::default();
        gate.disable();
        assert!(!gate.is_enabled());
        assert!(!gate.accept(LogLevel::Fatal));
        gate.enable();
        assert!(gate.accept(LogLevel::Debug));
    }
}
