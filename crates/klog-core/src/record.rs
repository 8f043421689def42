//! Log records and the record encoder
//!
//! A [`LogRecord`] is a fixed-shape value: every field has a fixed width,
//! so building one never allocates and copying one is a plain memcpy. The
//! encoder ([`LogRecord::encode`]) fills it from a [`CallSite`], the
//! platform's ambient context and the caller's format arguments.
//!
//! # Wire Layout
//!
//! Records cross the user/kernel boundary as [`RECORD_WIRE_SIZE`] bytes,
//! little-endian:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0      | 8    | sequence |
//! | 8      | 8    | timestamp (ticks) |
//! | 16     | 4    | cpu_id |
//! | 20     | 4    | pid |
//! | 24     | 4    | level |
//! | 28     | 4    | line |
//! | 32     | 16   | subsystem |
//! | 48     | 32   | file |
//! | 80     | 128  | message |

use core::fmt;

use klog_hal::HAL;
use serde::Serialize;

use crate::error::KlogError;
use crate::level::LogLevel;
use crate::text::FixedStr;

/// Width of the subsystem tag field, terminator included.
pub const LOG_SUBSYS_MAX: usize = 16;
/// Width of the source file field, terminator included.
pub const LOG_FILE_MAX: usize = 32;
/// Width of the message field, terminator included.
pub const LOG_MSG_MAX: usize = 128;

/// Size of one record on the wire.
pub const RECORD_WIRE_SIZE: usize = 32 + LOG_SUBSYS_MAX + LOG_FILE_MAX + LOG_MSG_MAX;

const OFF_SUBSYS: usize = 32;
const OFF_FILE: usize = OFF_SUBSYS + LOG_SUBSYS_MAX;
const OFF_MSG: usize = OFF_FILE + LOG_FILE_MAX;

/// Static description of a logging call: where it is and what it claims.
///
/// The `klog_*!` macros build one of these as a `const` per call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub level: LogLevel,
    pub subsystem: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub const fn new(level: LogLevel, subsystem: &'static str, file: &'static str, line: u32) -> Self {
        Self {
            level,
            subsystem,
            file,
            line,
        }
    }
}

/// One diagnostic event, immutable once stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    /// Global sequence number; 0 until the ring assigns one
    pub seq: u64,
    /// Monotonic tick at encode time
    pub timestamp: u64,
    /// CPU that produced the record
    pub cpu_id: u32,
    /// Process on whose behalf the record was produced (0 = none)
    pub pid: u32,
    pub level: LogLevel,
    pub subsystem: FixedStr<LOG_SUBSYS_MAX>,
    /// Final path component of the producing source file
    pub file: FixedStr<LOG_FILE_MAX>,
    pub line: u32,
    pub message: FixedStr<LOG_MSG_MAX>,
}

impl LogRecord {
    /// A zeroed record, used to initialize ring slots.
    pub const EMPTY: LogRecord = LogRecord {
        seq: 0,
        timestamp: 0,
        cpu_id: 0,
        pid: 0,
        level: LogLevel::Debug,
        subsystem: FixedStr::new(),
        file: FixedStr::new(),
        line: 0,
        message: FixedStr::new(),
    };

    /// Encode a record for `site`, stamped with the HAL's ambient context.
    ///
    /// Safe in restricted contexts: formats straight into the inline
    /// message field, truncating instead of allocating. The sequence number
    /// stays 0 until the ring stores the record.
    pub fn encode<H: HAL>(hal: &H, site: &CallSite, args: fmt::Arguments<'_>) -> Self {
        let mut record = LogRecord {
            seq: 0,
            timestamp: hal.now_ticks(),
            cpu_id: hal.cpu_id(),
            pid: hal.current_pid(),
            level: site.level,
            subsystem: FixedStr::from_str_truncated(site.subsystem),
            file: FixedStr::from_str_truncated(file_name(site.file)),
            line: site.line,
            message: FixedStr::new(),
        };
        // FixedStr never reports an error; a failing Display impl in the
        // arguments just leaves a shorter message.
        let _ = fmt::write(&mut record.message, args);
        record
    }

    /// Serialize into exactly [`RECORD_WIRE_SIZE`] bytes.
    pub fn write_wire(&self, out: &mut [u8; RECORD_WIRE_SIZE]) {
        out[0..8].copy_from_slice(&self.seq.to_le_bytes());
        out[8..16].copy_from_slice(&self.timestamp.to_le_bytes());
        out[16..20].copy_from_slice(&self.cpu_id.to_le_bytes());
        out[20..24].copy_from_slice(&self.pid.to_le_bytes());
        out[24..28].copy_from_slice(&(self.level as u32).to_le_bytes());
        out[28..32].copy_from_slice(&self.line.to_le_bytes());
        self.subsystem.write_wire(&mut out[OFF_SUBSYS..OFF_FILE]);
        self.file.write_wire(&mut out[OFF_FILE..OFF_MSG]);
        self.message.write_wire(&mut out[OFF_MSG..RECORD_WIRE_SIZE]);
    }

    /// Decode one record from its wire bytes.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, KlogError> {
        if bytes.len() < RECORD_WIRE_SIZE {
            return Err(KlogError::MalformedRecord);
        }
        let level = u8::try_from(le_u32(bytes, 24))
            .ok()
            .and_then(LogLevel::from_u8)
            .ok_or(KlogError::MalformedRecord)?;

        Ok(LogRecord {
            seq: le_u64(bytes, 0),
            timestamp: le_u64(bytes, 8),
            cpu_id: le_u32(bytes, 16),
            pid: le_u32(bytes, 20),
            level,
            line: le_u32(bytes, 28),
            subsystem: FixedStr::from_wire(&bytes[OFF_SUBSYS..OFF_FILE]),
            file: FixedStr::from_wire(&bytes[OFF_FILE..OFF_MSG]),
            message: FixedStr::from_wire(&bytes[OFF_MSG..RECORD_WIRE_SIZE]),
        })
    }
}

impl Default for LogRecord {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// `[ticks] [cpu:pid] [LEVEL] [subsys] file:line: message`
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}:{}] [{:<5}] [{}] {}:{}: {}",
            self.timestamp,
            self.cpu_id,
            self.pid,
            self.level,
            self.subsystem,
            self.file,
            self.line,
            self.message
        )
    }
}

/// Final component of a `/`- or `\`-separated path.
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

pub(crate) fn le_u64(bytes: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(raw)
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(raw)
}
