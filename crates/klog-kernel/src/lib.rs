//! Hosted kernel
//!
//! A small kernel that runs on the host and is instrumented throughout with
//! the kernel log engine. It gives the log real producers (process
//! lifecycle, file syscalls, device interrupts, boot) and gives the
//! inspection tools a kernel to issue `klogctl` against.
//!
//! # Model
//!
//! - Each process is an OS thread; the HAL maps threads onto `ncpu`
//!   simulated CPUs and tracks which pid a thread runs for.
//! - Files live in memory; descriptors are per process.
//! - Interrupts are delivered synchronously on the calling thread.
//!
//! # Usage
//!
//! ```ignore
//! let kernel = Kernel::boot(KernelConfig::from_env());
//! let me = kernel.attach("klogview");
//! let count = me.klogctl(KLOG_CMD_GET_COUNT, &mut [], 0);
//! ```

mod boot;
mod config;
mod dev;
mod error;
mod fs;
mod hal;
mod proc;
mod syscall;

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use klog_core::KernelLog;

pub use config::{KernelConfig, DEFAULT_NCPU, DEFAULT_TICKS_PER_MS};
pub use dev::{IRQ_CONSOLE, IRQ_DISK, IRQ_KEYBOARD, IRQ_LINES, IRQ_TIMER};
pub use error::KernelError;
pub use fs::{Fd, OpenMode, NOFILE};
pub use hal::HostHal;
pub use proc::{ProcessState, EXIT_PANIC, NPROC};
pub use syscall::Process;

use dev::InterruptCounters;
use fs::FileTable;
use proc::ProcessTable;

/// Process identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub u32);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The first process, parent of every orphan.
pub const INIT_PID: ProcessId = ProcessId(1);

pub struct Kernel {
    config: KernelConfig,
    log: KernelLog<HostHal>,
    procs: Mutex<ProcessTable>,
    child_exited: Condvar,
    files: Mutex<FileTable>,
    irqs: InterruptCounters,
}

impl Kernel {
    /// Boot a kernel: run the boot sequence and return once init's shell
    /// has finished.
    pub fn boot(config: KernelConfig) -> Arc<Kernel> {
        tracing::info!(ncpu = config.ncpu, "booting hosted kernel");
        let kernel = Arc::new(Kernel {
            config,
            log: KernelLog::with_config(HostHal::new(&config), config.log),
            procs: Mutex::new(ProcessTable::new()),
            child_exited: Condvar::new(),
            files: Mutex::new(FileTable::rootfs()),
            irqs: InterruptCounters::new(),
        });
        kernel.boot_sequence();
        kernel
    }

    /// Start a user program on the calling thread, as a child of init.
    pub fn attach(self: &Arc<Self>, name: &str) -> Process {
        let pid = self.proc_register(name, INIT_PID);
        self.hal().bind_current(pid.0);
        tracing::debug!(pid = pid.0, name, "attached user program");
        Process::new(Arc::clone(self), pid)
    }

    /// The kernel log engine.
    pub fn log(&self) -> &KernelLog<HostHal> {
        &self.log
    }

    pub fn hal(&self) -> &HostHal {
        self.log.hal()
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub(crate) fn procs(&self) -> MutexGuard<'_, ProcessTable> {
        self.procs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn files(&self) -> MutexGuard<'_, FileTable> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Size of a file in the root file system.
    pub fn file_size(&self, path: &str) -> Option<usize> {
        self.files().size(path)
    }
}
