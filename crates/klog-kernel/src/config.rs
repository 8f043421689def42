//! Hosted kernel configuration
//!
//! Read from the environment at boot; anything missing or unparsable falls
//! back to the default.

use klog_core::KlogConfig;

/// Simulated CPU count when `KLOG_NCPU` is unset.
pub const DEFAULT_NCPU: u32 = 8;

/// Tick rate when `KLOG_TICKS_PER_MS` is unset (microsecond ticks).
pub const DEFAULT_TICKS_PER_MS: u64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernelConfig {
    /// Number of simulated CPUs threads are spread across
    pub ncpu: u32,
    /// Timestamp resolution
    pub ticks_per_ms: u64,
    /// Initial log gate
    pub log: KlogConfig,
}

impl KernelConfig {
    pub fn from_env() -> Self {
        let ncpu = env_parse("KLOG_NCPU").filter(|&n: &u32| n > 0).unwrap_or(DEFAULT_NCPU);
        let ticks_per_ms = env_parse("KLOG_TICKS_PER_MS")
            .filter(|&t: &u64| t > 0)
            .unwrap_or(DEFAULT_TICKS_PER_MS);
        Self {
            ncpu,
            ticks_per_ms,
            log: KlogConfig::DEFAULT,
        }
    }

    pub fn with_ncpu(mut self, ncpu: u32) -> Self {
        self.ncpu = ncpu.max(1);
        self
    }

    pub fn with_log(mut self, log: KlogConfig) -> Self {
        self.log = log;
        self
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            ncpu: DEFAULT_NCPU,
            ticks_per_ms: DEFAULT_TICKS_PER_MS,
            log: KlogConfig::DEFAULT,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KernelConfig::default();
        assert_eq!(config.ncpu, 8);
        assert_eq!(config.ticks_per_ms, 1000);
        assert!(config.log.enabled);
    }

    #[test]
    fn test_with_ncpu_never_zero() {
        assert_eq!(KernelConfig::default().with_ncpu(0).ncpu, 1);
        assert_eq!(KernelConfig::default().with_ncpu(2).ncpu, 2);
    }
}
