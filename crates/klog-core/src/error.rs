//! Control-surface errors
//!
//! Producers never see an error: a gate rejection or a truncated field only
//! moves a counter. Errors exist solely on the control path, where they are
//! reported to user space as a negative return value.

use core::fmt;

/// Invalid argument (bad level, non-positive count, short buffer).
pub const EINVAL: i64 = -22;

/// Unknown control command.
pub const ENOSYS: i64 = -38;

/// Errors returned by the control surface and the wire codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KlogError {
    /// Severity outside `0..=4`
    InvalidLevel(i64),
    /// Level string that is neither a known name nor a number
    UnknownLevelName,
    /// Record count of zero or less
    InvalidCount(i64),
    /// Destination cannot hold the requested data
    BufferTooSmall { needed: usize, available: usize },
    /// Command number not in the command set
    UnknownCommand(u32),
    /// Wire bytes that do not decode to a record
    MalformedRecord,
    /// A negative control-call result observed from user space
    Errno(i64),
}

impl KlogError {
    /// The negative ABI code for this error.
    pub const fn errno(self) -> i64 {
        match self {
            KlogError::UnknownCommand(_) => ENOSYS,
            KlogError::Errno(code) => code,
            KlogError::InvalidLevel(_)
            | KlogError::UnknownLevelName
            | KlogError::InvalidCount(_)
            | KlogError::BufferTooSmall { .. }
            | KlogError::MalformedRecord => EINVAL,
        }
    }

    /// Wrap a negative control-call result.
    pub const fn from_errno(code: i64) -> Self {
        KlogError::Errno(code)
    }

    /// Whether this is an invalid-argument failure.
    pub const fn is_invalid_argument(self) -> bool {
        self.errno() == EINVAL
    }
}

impl fmt::Display for KlogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KlogError::InvalidLevel(v) => write!(f, "invalid log level {v} (expected 0-4)"),
            KlogError::UnknownLevelName => f.write_str("unknown log level name"),
            KlogError::InvalidCount(v) => write!(f, "invalid record count {v}"),
            KlogError::BufferTooSmall { needed, available } => write!(
                f,
                "buffer too small: need {needed} bytes, have {available}"
            ),
            KlogError::UnknownCommand(cmd) => write!(f, "unknown klogctl command {cmd}"),
            KlogError::MalformedRecord => f.write_str("malformed log record"),
            KlogError::Errno(code) => write!(f, "klogctl failed with {code}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KlogError {}
