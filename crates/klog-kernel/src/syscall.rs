//! User-facing syscalls
//!
//! A [`Process`] is a user program's handle on the kernel: every method is
//! one syscall executed on behalf of that pid. Syscall entry is traced at
//! DEBUG under the `syscall` tag; `klogctl` is the exception and never logs
//! itself.

use std::sync::Arc;

use klog_core::klog_debug;

use crate::error::KernelError;
use crate::fs::{Fd, OpenMode};
use crate::{Kernel, ProcessId};

#[derive(Clone)]
pub struct Process {
    kernel: Arc<Kernel>,
    pid: ProcessId,
}

impl Process {
    pub(crate) fn new(kernel: Arc<Kernel>, pid: ProcessId) -> Self {
        Self { kernel, pid }
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    pub fn kernel(&self) -> &Arc<Kernel> {
        &self.kernel
    }

    // ========================================================================
    // Process lifecycle
    // ========================================================================

    /// Start a child process running `body`; its return value is the exit
    /// status.
    pub fn fork<F>(&self, name: &str, body: F) -> Result<ProcessId, KernelError>
    where
        F: FnOnce(Process) -> i32 + Send + 'static,
    {
        klog_debug!(self.kernel.log(), "syscall", "fork pid={}", self.pid);
        self.kernel.proc_fork(self.pid, name, body)
    }

    /// Reap one exited child: `(pid, status)`.
    pub fn wait(&self) -> Result<(ProcessId, i32), KernelError> {
        klog_debug!(self.kernel.log(), "syscall", "wait pid={}", self.pid);
        self.kernel.proc_wait(self.pid)
    }

    pub fn exit(self, code: i32) {
        klog_debug!(self.kernel.log(), "syscall", "exit pid={}", self.pid);
        self.kernel.proc_exit(self.pid, code);
    }

    // ========================================================================
    // Files
    // ========================================================================

    pub fn open(&self, path: &str, mode: OpenMode) -> Result<Fd, KernelError> {
        klog_debug!(self.kernel.log(), "syscall", "open pid={}", self.pid);
        self.kernel.fs_open(self.pid, path, mode)
    }

    pub fn read(&self, fd: Fd, buf: &mut [u8]) -> Result<usize, KernelError> {
        klog_debug!(self.kernel.log(), "syscall", "read pid={}", self.pid);
        self.kernel.fs_read(self.pid, fd, buf)
    }

    pub fn write(&self, fd: Fd, bytes: &[u8]) -> Result<usize, KernelError> {
        klog_debug!(self.kernel.log(), "syscall", "write pid={}", self.pid);
        self.kernel.fs_write(self.pid, fd, bytes)
    }

    pub fn close(&self, fd: Fd) -> Result<(), KernelError> {
        klog_debug!(self.kernel.log(), "syscall", "close pid={}", self.pid);
        self.kernel.fs_close(self.pid, fd)
    }

    // ========================================================================
    // Kernel log
    // ========================================================================

    /// The kernel log control call; see `klog_core::KernelLog::klogctl`.
    pub fn klogctl(&self, cmd: u32, arg1: &mut [u8], arg2: i64) -> i64 {
        self.kernel.log().klogctl(cmd, arg1, arg2)
    }
}

impl std::fmt::Debug for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process").field("pid", &self.pid).finish()
    }
}
