//! Kernel syscall errors

use std::fmt;

/// Errors returned by the hosted kernel's syscalls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelError {
    /// No process with that pid
    ProcessNotFound,
    /// `wait` with no children left
    NoChildren,
    /// Descriptor not open in the calling process
    BadDescriptor,
    /// Path does not exist
    FileNotFound,
    /// Write on a read-only descriptor
    PermissionDenied,
    /// Per-process descriptor table is full
    TooManyOpenFiles,
    /// The host refused to start another thread
    ResourceExhausted,
}

impl KernelError {
    /// The negative ABI code for this error.
    pub const fn errno(self) -> i64 {
        match self {
            KernelError::PermissionDenied => -1,
            KernelError::FileNotFound => -2,
            KernelError::ProcessNotFound => -3,
            KernelError::BadDescriptor => -9,
            KernelError::NoChildren => -10,
            KernelError::ResourceExhausted => -11,
            KernelError::TooManyOpenFiles => -24,
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            KernelError::ProcessNotFound => "no such process",
            KernelError::NoChildren => "no child processes",
            KernelError::BadDescriptor => "bad file descriptor",
            KernelError::FileNotFound => "no such file",
            KernelError::PermissionDenied => "descriptor not open for writing",
            KernelError::TooManyOpenFiles => "too many open files",
            KernelError::ResourceExhausted => "cannot start process thread",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for KernelError {}
