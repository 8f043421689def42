//! Severity levels
//!
//! Ordinals are part of the user-space ABI (`SET_LEVEL`, the record wire
//! layout, the per-level statistics array) and must never be renumbered.

use core::fmt;
use core::str::FromStr;

use serde::Serialize;

use crate::error::KlogError;

/// Number of severity levels; length of `Stats::logs_by_level`.
pub const LOG_LEVEL_COUNT: usize = 5;

/// Record severity, ordered `Debug < Info < Warn < Error < Fatal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

impl LogLevel {
    /// All levels in ascending order.
    pub const ALL: [LogLevel; LOG_LEVEL_COUNT] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Convert from the ABI ordinal.
    ///
    /// Returns `None` for anything outside `0..=4`.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LogLevel::Debug),
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Warn),
            3 => Some(LogLevel::Error),
            4 => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    /// Convert a raw control-call argument, rejecting out-of-range values.
    pub fn from_arg(value: i64) -> Result<Self, KlogError> {
        u8::try_from(value)
            .ok()
            .and_then(Self::from_u8)
            .ok_or(KlogError::InvalidLevel(value))
    }

    /// Index into per-level arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Accepts a level name (`"WARN"`) or its ordinal (`"2"`).
impl FromStr for LogLevel {
    type Err = KlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let by_name = LogLevel::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s));
        if let Some(level) = by_name {
            return Ok(level);
        }
        match s.parse::<i64>() {
            Ok(n) => LogLevel::from_arg(n),
            Err(_) => Err(KlogError::UnknownLevelName),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_from_u8_roundtrips_ordinals() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_u8(level as u8), Some(level));
        }
        assert_eq!(LogLevel::from_u8(5), None);
    }

    #[test]
    fn test_from_arg_rejects_out_of_range() {
        assert_eq!(LogLevel::from_arg(3), Ok(LogLevel::Error));
        assert_eq!(LogLevel::from_arg(-1), Err(KlogError::InvalidLevel(-1)));
        assert_eq!(LogLevel::from_arg(5), Err(KlogError::InvalidLevel(5)));
        assert_eq!(LogLevel::from_arg(256), Err(KlogError::InvalidLevel(256)));
    }

    #[test]
    fn test_parse_name_or_ordinal() {
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("fatal".parse::<LogLevel>(), Ok(LogLevel::Fatal));
        assert_eq!("0".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("7".parse::<LogLevel>(), Err(KlogError::InvalidLevel(7)));
        assert_eq!("LOUD".parse::<LogLevel>(), Err(KlogError::UnknownLevelName));
    }
}
