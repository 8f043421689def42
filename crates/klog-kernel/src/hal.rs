//! Host HAL
//!
//! OS threads stand in for CPUs and processes. Each thread is pinned to a
//! simulated CPU the first time it asks, round-robin over `ncpu`; the
//! current pid is whatever process the thread was last bound to.

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use klog_hal::HAL;

use crate::config::KernelConfig;

thread_local! {
    static CPU: Cell<Option<u32>> = const { Cell::new(None) };
    static PID: Cell<u32> = const { Cell::new(0) };
}

pub struct HostHal {
    boot: Instant,
    ncpu: u32,
    ticks_per_ms: u64,
    next_cpu: AtomicU32,
}

impl HostHal {
    pub fn new(config: &KernelConfig) -> Self {
        Self {
            boot: Instant::now(),
            ncpu: config.ncpu.max(1),
            ticks_per_ms: config.ticks_per_ms.max(1),
            next_cpu: AtomicU32::new(0),
        }
    }

    /// Run the calling thread on behalf of `pid`.
    pub fn bind_current(&self, pid: u32) {
        PID.with(|p| p.set(pid));
    }

    /// Leave process context (interrupt handlers, kernel threads).
    pub fn unbind_current(&self) {
        PID.with(|p| p.set(0));
    }

    pub fn ncpu(&self) -> u32 {
        self.ncpu
    }
}

impl HAL for HostHal {
    fn now_ticks(&self) -> u64 {
        let micros = self.boot.elapsed().as_micros();
        u64::try_from(micros * u128::from(self.ticks_per_ms) / 1000).unwrap_or(u64::MAX)
    }

    fn cpu_id(&self) -> u32 {
        CPU.with(|cpu| match cpu.get() {
            // The slot is per thread, not per HAL; re-clamp for this HAL.
            Some(id) => id % self.ncpu,
            None => {
                let id = self.next_cpu.fetch_add(1, Ordering::Relaxed) % self.ncpu;
                cpu.set(Some(id));
                id
            }
        })
    }

    fn current_pid(&self) -> u32 {
        PID.with(|p| p.get())
    }

    fn debug_write(&self, msg: &str) {
        tracing::debug!(target: "klog", "{}", msg);
    }
}
