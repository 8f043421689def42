//! Kernel log engine
//!
//! Structured, leveled, bounded-memory logging for kernel code. Producers on
//! any CPU, including contexts that cannot block or allocate, emit records
//! through the `klog_*!` macros; user space inspects and steers the engine
//! through a single multiplexed control call.
//!
//! # Components
//!
//! - [`Gate`]: enable flag plus minimum severity
//! - [`LogRecord::encode`]: fixed-width record stamped with time, CPU and pid
//! - [`RingBuffer`]: fixed-capacity store that overwrites its oldest record
//! - [`Stats`]: accepted/dropped/wrap counters, per level
//! - [`KernelLog`]: all of the above behind one spin lock
//! - [`Control`] / [`KernelLog::klogctl`]: the control surface
//!
//! # Platform
//!
//! Time, CPU and process identity come from a [`klog_hal::HAL`]
//! implementation supplied by the embedding kernel.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(any(test, feature = "std"))]
extern crate std;

mod config;
mod control;
mod engine;
mod error;
mod gate;
mod invariants;
mod level;
mod macros;
mod record;
mod ring;
mod stats;
mod text;

pub use config::{KlogConfig, LOG_RING_SIZE};
pub use control::{
    Control, KLOG_CMD_CLEAR, KLOG_CMD_DISABLE, KLOG_CMD_ENABLE, KLOG_CMD_GET_COUNT,
    KLOG_CMD_GET_LEVEL, KLOG_CMD_GET_STATS, KLOG_CMD_READ, KLOG_CMD_SET_LEVEL,
};
pub use engine::KernelLog;
pub use error::{KlogError, EINVAL, ENOSYS};
pub use gate::Gate;
pub use invariants::{check_all_invariants, InvariantViolation};
pub use level::{LogLevel, LOG_LEVEL_COUNT};
pub use record::{CallSite, LogRecord, LOG_FILE_MAX, LOG_MSG_MAX, LOG_SUBSYS_MAX, RECORD_WIRE_SIZE};
pub use ring::{Pushed, RingBuffer};
pub use stats::{Stats, STATS_WIRE_SIZE};
pub use text::FixedStr;

pub use klog_hal::HAL;
