//! Engine configuration
//!
//! Capacity is fixed at compile time through `KernelLog`'s const generic;
//! only the initial gate state is configurable.

use crate::level::LogLevel;

/// Default ring capacity for the process-wide instance.
pub const LOG_RING_SIZE: usize = 256;

/// Initial gate state applied when an engine is constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KlogConfig {
    /// Lowest severity admitted
    pub min_level: LogLevel,
    /// Whether records are admitted at all
    pub enabled: bool,
}

impl KlogConfig {
    /// Enabled, lowest threshold.
    pub const DEFAULT: KlogConfig = KlogConfig {
        min_level: LogLevel::Debug,
        enabled: true,
    };

    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Default for KlogConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
