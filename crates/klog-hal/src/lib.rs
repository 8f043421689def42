//! Hardware Abstraction Layer trait for the kernel log engine
//!
//! The engine stamps every record with ambient context (monotonic time,
//! executing CPU, current process) that only the platform knows. This crate
//! defines the HAL trait that supplies it, so the engine itself stays
//! platform-free and can run inside a kernel, a hosted simulation, or a
//! unit test.
//!
//! # Platform Implementations
//!
//! - **Hosted**: `klog-kernel::HostHal` (OS threads as CPUs, `Instant` for ticks)
//! - **Tests**: [`TestHal`] (atomics, fully controllable)
//!
//! # Restricted Contexts
//!
//! Every method may be called from a context that cannot block or allocate
//! (interrupt handlers, code holding scheduler locks). Implementations must
//! respect that: read a counter, read a register, return.

#![no_std]

use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Hardware Abstraction Layer trait
///
/// Implementations provide platform-specific functionality for:
/// - Time measurement (monotonic ticks)
/// - Identity of the executing CPU and process
/// - Debug output for engine self-diagnostics
pub trait HAL: Send + Sync + 'static {
    // === Time ===

    /// Current monotonic time in ticks.
    ///
    /// Never goes backwards on a single CPU. The tick length is
    /// platform-defined.
    fn now_ticks(&self) -> u64;

    // === Execution Context ===

    /// Identifier of the CPU executing the caller.
    fn cpu_id(&self) -> u32;

    /// Process id of the process on whose behalf the caller runs.
    ///
    /// Returns 0 when no process is current (early boot, interrupt context).
    fn current_pid(&self) -> u32;

    // === Debug ===

    /// Write a debug message to the platform's console.
    ///
    /// Must not route back into the log engine.
    fn debug_write(&self, msg: &str);
}

impl<T: HAL> HAL for &'static T {
    fn now_ticks(&self) -> u64 {
        (**self).now_ticks()
    }

    fn cpu_id(&self) -> u32 {
        (**self).cpu_id()
    }

    fn current_pid(&self) -> u32 {
        (**self).current_pid()
    }

    fn debug_write(&self, msg: &str) {
        (**self).debug_write(msg)
    }
}

/// A minimal test HAL for unit testing
///
/// Time advances by one tick on every read so records written in sequence
/// carry strictly increasing timestamps. CPU and pid are plain settable
/// values; debug output is counted, not stored.
#[derive(Debug, Default)]
pub struct TestHal {
    time: AtomicU64,
    cpu: AtomicU32,
    pid: AtomicU32,
    debug_writes: AtomicU64,
}

impl TestHal {
    pub const fn new() -> Self {
        Self {
            time: AtomicU64::new(0),
            cpu: AtomicU32::new(0),
            pid: AtomicU32::new(0),
            debug_writes: AtomicU64::new(0),
        }
    }

    /// Set the tick counter; the next read returns `ticks`.
    pub fn set_time(&self, ticks: u64) {
        self.time.store(ticks, Ordering::SeqCst);
    }

    /// Set the CPU id reported to the engine.
    pub fn set_cpu(&self, cpu: u32) {
        self.cpu.store(cpu, Ordering::SeqCst);
    }

    /// Set the pid reported to the engine.
    pub fn set_pid(&self, pid: u32) {
        self.pid.store(pid, Ordering::SeqCst);
    }

    /// Number of `debug_write` calls so far.
    pub fn debug_writes(&self) -> u64 {
        self.debug_writes.load(Ordering::SeqCst)
    }
}

impl HAL for TestHal {
    fn now_ticks(&self) -> u64 {
        self.time.fetch_add(1, Ordering::SeqCst)
    }

    fn cpu_id(&self) -> u32 {
        self.cpu.load(Ordering::SeqCst)
    }

    fn current_pid(&self) -> u32 {
        self.pid.load(Ordering::SeqCst)
    }

    fn debug_write(&self, _msg: &str) {
        self.debug_writes.fetch_add(1, Ordering::SeqCst);
    }
}
