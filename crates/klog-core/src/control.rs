//! Control surface
//!
//! The single multiplexed entry point user space uses to inspect and steer
//! the log engine. Two layers:
//!
//! - [`Control`]: typed requests, dispatched by [`KernelLog::control`]
//! - [`KernelLog::klogctl`]: the raw syscall ABI, `(command, arg1, arg2)`
//!   with a byte buffer as `arg1` and a negative errno on failure
//!
//! # Commands
//!
//! | Command | Number | arg1 | arg2 | Result |
//! |---------|--------|------|------|--------|
//! | GET_COUNT | 1 | - | - | retained records |
//! | GET_LEVEL | 2 | - | - | threshold ordinal |
//! | SET_LEVEL | 3 | - | level | 0 |
//! | CLEAR | 4 | - | - | 0 |
//! | READ | 5 | buffer | max records | records copied |
//! | GET_STATS | 6 | buffer | - | 0 |
//! | ENABLE | 7 | - | - | 0 |
//! | DISABLE | 8 | - | - | 0 |
//!
//! Every command runs synchronously and takes the engine lock once.

use klog_hal::HAL;

use crate::engine::KernelLog;
use crate::error::KlogError;
use crate::level::LogLevel;
use crate::record::{LogRecord, RECORD_WIRE_SIZE};
use crate::stats::{Stats, STATS_WIRE_SIZE};

// ============================================================================
// Command numbers
// ============================================================================

pub const KLOG_CMD_GET_COUNT: u32 = 1;
pub const KLOG_CMD_GET_LEVEL: u32 = 2;
pub const KLOG_CMD_SET_LEVEL: u32 = 3;
pub const KLOG_CMD_CLEAR: u32 = 4;
pub const KLOG_CMD_READ: u32 = 5;
pub const KLOG_CMD_GET_STATS: u32 = 6;
pub const KLOG_CMD_ENABLE: u32 = 7;
pub const KLOG_CMD_DISABLE: u32 = 8;

/// A typed control request.
#[derive(Debug)]
pub enum Control<'a> {
    GetCount,
    GetLevel,
    /// Raw ordinal, validated on dispatch
    SetLevel(i64),
    Clear,
    /// Copy up to `max` records, oldest first, into `out`
    Read { out: &'a mut [LogRecord], max: i64 },
    GetStats(&'a mut Stats),
    Enable,
    Disable,
}

impl Control<'_> {
    /// The ABI command number for this request.
    pub const fn command(&self) -> u32 {
        match self {
            Control::GetCount => KLOG_CMD_GET_COUNT,
            Control::GetLevel => KLOG_CMD_GET_LEVEL,
            Control::SetLevel(_) => KLOG_CMD_SET_LEVEL,
            Control::Clear => KLOG_CMD_CLEAR,
            Control::Read { .. } => KLOG_CMD_READ,
            Control::GetStats(_) => KLOG_CMD_GET_STATS,
            Control::Enable => KLOG_CMD_ENABLE,
            Control::Disable => KLOG_CMD_DISABLE,
        }
    }
}

/// Validate a READ request size against a destination of `available`
/// bytes, returning the record count to copy.
fn read_len(max: i64, available: usize) -> Result<usize, KlogError> {
    if max <= 0 {
        return Err(KlogError::InvalidCount(max));
    }
    let max = usize::try_from(max).map_err(|_| KlogError::InvalidCount(max))?;
    let needed = max.checked_mul(RECORD_WIRE_SIZE).unwrap_or(usize::MAX);
    if available < needed {
        return Err(KlogError::BufferTooSmall { needed, available });
    }
    Ok(max)
}

impl<H: HAL, const N: usize> KernelLog<H, N> {
    /// Dispatch a typed control request.
    pub fn control(&self, request: Control<'_>) -> Result<usize, KlogError> {
        match request {
            Control::GetCount => Ok(self.count()),
            Control::GetLevel => Ok(self.level().index()),
            Control::SetLevel(raw) => {
                self.set_level(LogLevel::from_arg(raw)?);
                Ok(0)
            }
            Control::Clear => {
                self.clear();
                Ok(0)
            }
            Control::Read { out, max } => {
                let max = read_len(max, out.len().saturating_mul(RECORD_WIRE_SIZE))?;
                Ok(self.read_batch(out, max))
            }
            Control::GetStats(out) => {
                *out = self.stats();
                Ok(0)
            }
            Control::Enable => {
                self.enable();
                Ok(0)
            }
            Control::Disable => {
                self.disable();
                Ok(0)
            }
        }
    }

    /// The raw control call.
    ///
    /// `arg1` is the caller's buffer (READ, GET_STATS), `arg2` the scalar
    /// argument (SET_LEVEL level, READ max). Returns the command's result,
    /// or a negative errno.
    pub fn klogctl(&self, cmd: u32, arg1: &mut [u8], arg2: i64) -> i64 {
        match self.klogctl_inner(cmd, arg1, arg2) {
            Ok(value) => value as i64,
            Err(e) => e.errno(),
        }
    }

    fn klogctl_inner(&self, cmd: u32, arg1: &mut [u8], arg2: i64) -> Result<usize, KlogError> {
        match cmd {
            KLOG_CMD_GET_COUNT => self.control(Control::GetCount),
            KLOG_CMD_GET_LEVEL => self.control(Control::GetLevel),
            KLOG_CMD_SET_LEVEL => self.control(Control::SetLevel(arg2)),
            KLOG_CMD_CLEAR => self.control(Control::Clear),
            KLOG_CMD_ENABLE => self.control(Control::Enable),
            KLOG_CMD_DISABLE => self.control(Control::Disable),
            KLOG_CMD_READ => {
                let max = read_len(arg2, arg1.len())?;
                Ok(self.with_state(|state| {
                    let mut copied = 0;
                    for (chunk, record) in arg1
                        .chunks_exact_mut(RECORD_WIRE_SIZE)
                        .zip(state.ring.iter().take(max))
                    {
                        if let Ok(slot) = <&mut [u8; RECORD_WIRE_SIZE]>::try_from(chunk) {
                            record.write_wire(slot);
                            copied += 1;
                        }
                    }
                    copied
                }))
            }
            KLOG_CMD_GET_STATS => {
                let available = arg1.len();
                let out = arg1
                    .get_mut(..STATS_WIRE_SIZE)
                    .and_then(|head| <&mut [u8; STATS_WIRE_SIZE]>::try_from(head).ok())
                    .ok_or(KlogError::BufferTooSmall {
                        needed: STATS_WIRE_SIZE,
                        available,
                    })?;
                self.stats().write_wire(out);
                Ok(0)
            }
            other => Err(KlogError::UnknownCommand(other)),
        }
    }
}
