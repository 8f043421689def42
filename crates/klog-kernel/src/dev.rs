//! Device interrupts
//!
//! Handlers run in interrupt context: no current process, so records they
//! produce carry pid 0. The interrupted thread's binding is restored on
//! return.

use std::sync::atomic::{AtomicU64, Ordering};

use klog_core::{klog_debug, klog_info, klog_warn};
use klog_hal::HAL;

use crate::Kernel;

pub const IRQ_TIMER: u8 = 0;
pub const IRQ_KEYBOARD: u8 = 1;
pub const IRQ_CONSOLE: u8 = 4;
pub const IRQ_DISK: u8 = 14;

/// Highest IRQ line the controller delivers.
pub const IRQ_LINES: usize = 16;

/// Per-line delivery counters.
pub(crate) struct InterruptCounters([AtomicU64; IRQ_LINES]);

impl InterruptCounters {
    pub(crate) fn new() -> Self {
        Self(std::array::from_fn(|_| AtomicU64::new(0)))
    }
}

impl Kernel {
    /// Deliver interrupt `irq` on the calling CPU.
    pub fn interrupt(&self, irq: u8) {
        let hal = self.log().hal();
        let interrupted = hal.current_pid();
        hal.unbind_current();

        let count = match self.irqs.0.get(usize::from(irq)) {
            Some(counter) => counter.fetch_add(1, Ordering::Relaxed) + 1,
            None => 0,
        };
        match irq {
            IRQ_TIMER => klog_debug!(self.log(), "dev", "timer tick {}", count),
            IRQ_KEYBOARD => klog_debug!(self.log(), "dev", "keyboard scancode ready"),
            IRQ_CONSOLE => klog_info!(self.log(), "dev", "console rx interrupt"),
            IRQ_DISK => klog_debug!(self.log(), "dev", "disk request complete ({} total)", count),
            other => klog_warn!(self.log(), "dev", "unexpected interrupt irq={}", other),
        }

        hal.bind_current(interrupted);
    }

    /// Interrupts delivered on `irq` since boot.
    pub fn interrupt_count(&self, irq: u8) -> u64 {
        self.irqs
            .0
            .get(usize::from(irq))
            .map_or(0, |counter| counter.load(Ordering::Relaxed))
    }
}
