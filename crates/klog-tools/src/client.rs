//! Typed wrapper over the raw `klogctl` call
//!
//! Turns negative returns into [`KlogError`] and decodes the wire formats,
//! so the programs never touch byte buffers.

use klog_core::{
    KlogError, LogLevel, LogRecord, Stats, KLOG_CMD_CLEAR, KLOG_CMD_DISABLE, KLOG_CMD_ENABLE,
    KLOG_CMD_GET_COUNT, KLOG_CMD_GET_LEVEL, KLOG_CMD_GET_STATS, KLOG_CMD_READ,
    KLOG_CMD_SET_LEVEL, RECORD_WIRE_SIZE, STATS_WIRE_SIZE,
};
use klog_kernel::Process;

/// Most records a single read asks for.
pub const READ_BATCH: usize = 256;

/// The log operations the programs drive.
pub trait LogControl {
    fn count(&self) -> Result<usize, KlogError>;
    fn set_level(&self, level: LogLevel) -> Result<(), KlogError>;
    fn clear(&self) -> Result<(), KlogError>;
    fn enable(&self) -> Result<(), KlogError>;
    fn disable(&self) -> Result<(), KlogError>;
    fn read(&self, max: usize) -> Result<Vec<LogRecord>, KlogError>;
    fn stats(&self) -> Result<Stats, KlogError>;
}

/// [`LogControl`] over a process's `klogctl` call.
pub struct KlogClient<'a> {
    process: &'a Process,
}

impl<'a> KlogClient<'a> {
    pub fn new(process: &'a Process) -> Self {
        Self { process }
    }

    fn call(&self, cmd: u32, arg1: &mut [u8], arg2: i64) -> Result<usize, KlogError> {
        let ret = self.process.klogctl(cmd, arg1, arg2);
        usize::try_from(ret).map_err(|_| KlogError::from_errno(ret))
    }

    pub fn count(&self) -> Result<usize, KlogError> {
        self.call(KLOG_CMD_GET_COUNT, &mut [], 0)
    }

    pub fn level(&self) -> Result<LogLevel, KlogError> {
        let raw = self.call(KLOG_CMD_GET_LEVEL, &mut [], 0)?;
        LogLevel::from_arg(raw as i64)
    }

    pub fn set_level(&self, level: LogLevel) -> Result<(), KlogError> {
        self.set_level_raw(level as i64)
    }

    /// SET_LEVEL with an unchecked ordinal.
    pub fn set_level_raw(&self, raw: i64) -> Result<(), KlogError> {
        self.call(KLOG_CMD_SET_LEVEL, &mut [], raw).map(drop)
    }

    pub fn clear(&self) -> Result<(), KlogError> {
        self.call(KLOG_CMD_CLEAR, &mut [], 0).map(drop)
    }

    pub fn enable(&self) -> Result<(), KlogError> {
        self.call(KLOG_CMD_ENABLE, &mut [], 0).map(drop)
    }

    pub fn disable(&self) -> Result<(), KlogError> {
        self.call(KLOG_CMD_DISABLE, &mut [], 0).map(drop)
    }

    /// Read up to `max` records, oldest first.
    pub fn read(&self, max: usize) -> Result<Vec<LogRecord>, KlogError> {
        let mut buf = vec![0u8; max.saturating_mul(RECORD_WIRE_SIZE)];
        let max = i64::try_from(max).map_err(|_| KlogError::InvalidCount(i64::MAX))?;
        let copied = self.call(KLOG_CMD_READ, &mut buf, max)?;
        buf.chunks_exact(RECORD_WIRE_SIZE)
            .take(copied)
            .map(LogRecord::from_wire)
            .collect()
    }

    pub fn stats(&self) -> Result<Stats, KlogError> {
        let mut buf = [0u8; STATS_WIRE_SIZE];
        self.call(KLOG_CMD_GET_STATS, &mut buf, 0)?;
        Stats::from_wire(&buf)
    }
}

impl LogControl for KlogClient<'_> {
    fn count(&self) -> Result<usize, KlogError> {
        KlogClient::count(self)
    }

    fn set_level(&self, level: LogLevel) -> Result<(), KlogError> {
        KlogClient::set_level(self, level)
    }

    fn clear(&self) -> Result<(), KlogError> {
        KlogClient::clear(self)
    }

    fn enable(&self) -> Result<(), KlogError> {
        KlogClient::enable(self)
    }

    fn disable(&self) -> Result<(), KlogError> {
        KlogClient::disable(self)
    }

    fn read(&self, max: usize) -> Result<Vec<LogRecord>, KlogError> {
        KlogClient::read(self, max)
    }

    fn stats(&self) -> Result<Stats, KlogError> {
        KlogClient::stats(self)
    }
}
