//! Kernel log engine
//!
//! [`KernelLog`] ties the gate, the ring and the statistics together behind
//! a single spin lock. It is the one context object the rest of the kernel
//! holds; there is no hidden global.
//!
//! # Lock Domain
//!
//! Every operation takes the lock once. A producer encodes its record
//! before locking, then checks the gate and either stores the record or
//! counts a drop inside the same critical section. A reader therefore never
//! sees a half-written slot, and a gate change is never observed halfway
//! through a write.
//!
//! Self-diagnostics go to [`HAL::debug_write`] after the lock is released.

use core::fmt::{self, Write};

use klog_hal::HAL;
use klog_sync::SpinLock;

use crate::config::{KlogConfig, LOG_RING_SIZE};
use crate::gate::Gate;
use crate::invariants::{check_all_invariants, InvariantViolation};
use crate::level::LogLevel;
use crate::record::{CallSite, LogRecord};
use crate::ring::RingBuffer;
use crate::stats::Stats;
use crate::text::FixedStr;

/// Everything guarded by the engine lock.
pub(crate) struct LogState<const N: usize> {
    pub(crate) gate: Gate,
    pub(crate) ring: RingBuffer<N>,
    pub(crate) stats: Stats,
}

impl<const N: usize> LogState<N> {
    const fn new(config: KlogConfig) -> Self {
        Self {
            gate: Gate::new(config),
            ring: RingBuffer::new(),
            stats: Stats::ZERO,
        }
    }

    /// Gate check plus store-or-drop, one critical section.
    fn admit(&mut self, record: LogRecord) -> Option<u64> {
        if !self.gate.accept(record.level) {
            self.stats.record_dropped();
            return None;
        }
        let pushed = self.ring.push(record);
        self.stats.record_accepted(record.level, pushed.wrapped);
        Some(pushed.seq)
    }
}

/// The kernel log: gate, ring buffer store and statistics of capacity `N`.
pub struct KernelLog<H: HAL, const N: usize = LOG_RING_SIZE> {
    hal: H,
    state: SpinLock<LogState<N>>,
}

impl<H: HAL, const N: usize> KernelLog<H, N> {
    /// Engine with the default gate: enabled, threshold DEBUG.
    ///
    /// # Stack Usage
    ///
    /// The ring is stored inline, about `N * 232` bytes, and a runtime call
    /// builds it on the caller's stack (several times over in debug
    /// builds). A thousand slots is fine on a default thread; larger
    /// capacities belong in a `static`, which is built at compile time:
    ///
    /// ```ignore
    /// static KLOG: KernelLog<BoardHal, 8192> = KernelLog::new(BoardHal);
    /// ```
    pub const fn new(hal: H) -> Self {
        Self::with_config(hal, KlogConfig::DEFAULT)
    }

    pub const fn with_config(hal: H, config: KlogConfig) -> Self {
        Self {
            hal,
            state: SpinLock::new(LogState::new(config)),
        }
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    // ========================================================================
    // Producer side
    // ========================================================================

    /// Encode and submit one record for `site`.
    ///
    /// Never fails. Returns the sequence number assigned when the record
    /// was stored, `None` when the gate dropped it.
    pub fn log(&self, site: &CallSite, args: fmt::Arguments<'_>) -> Option<u64> {
        let record = LogRecord::encode(&self.hal, site, args);
        self.submit(record)
    }

    /// Submit an already encoded record through the gate.
    pub fn submit(&self, record: LogRecord) -> Option<u64> {
        self.state.lock().admit(record)
    }

    // ========================================================================
    // Gate
    // ========================================================================

    pub fn set_level(&self, level: LogLevel) {
        let previous = {
            let mut state = self.state.lock();
            let previous = state.gate.level();
            state.gate.set_level(level);
            previous
        };
        self.diag(format_args!("[klog] level {previous} -> {level}"));
    }

    pub fn level(&self) -> LogLevel {
        self.state.lock().gate.level()
    }

    pub fn enable(&self) {
        self.state.lock().gate.enable();
        self.diag(format_args!("[klog] logging enabled"));
    }

    pub fn disable(&self) {
        self.state.lock().gate.disable();
        self.diag(format_args!("[klog] logging disabled"));
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().gate.is_enabled()
    }

    // ========================================================================
    // Store and statistics
    // ========================================================================

    /// Number of retained records, at most `N`.
    pub fn count(&self) -> usize {
        self.state.lock().ring.len()
    }

    /// Copy up to `max` retained records, oldest first. Non-destructive.
    pub fn read_batch(&self, out: &mut [LogRecord], max: usize) -> usize {
        self.state.lock().ring.read_batch(out, max)
    }

    /// Consistent snapshot of the counters.
    pub fn stats(&self) -> Stats {
        self.state.lock().stats
    }

    /// Empty the store and zero the statistics. The gate is untouched and
    /// sequence numbering continues.
    pub fn clear(&self) {
        let discarded = {
            let mut state = self.state.lock();
            let discarded = state.ring.len();
            state.ring.clear();
            state.stats.reset();
            discarded
        };
        self.diag(format_args!("[klog] cleared {discarded} records"));
    }

    /// Verify the store invariants under the lock.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let result = {
            let state = self.state.lock();
            check_all_invariants(&state.ring, &state.stats)
        };
        if let Err(violation) = result {
            self.diag(format_args!("[klog] invariant violated: {violation}"));
        }
        result
    }

    /// Run `f` inside the lock domain.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut LogState<N>) -> R) -> R {
        let mut state = self.state.lock();
        f(&mut *state)
    }

    fn diag(&self, args: fmt::Arguments<'_>) {
        let mut line = FixedStr::<96>::new();
        let _ = line.write_fmt(args);
        self.hal.debug_write(line.as_str());
    }
}

impl<H: HAL + Default, const N: usize> Default for KernelLog<H, N> {
    fn default() -> Self {
        Self::new(H::default())
    }
}
