//! Boot sequence
//!
//! Brings the kernel to the state a freshly booted machine is in when the
//! first user program runs: log engine announced, root file system mounted,
//! interrupts flowing, init started and its shell run to completion.

use std::sync::Arc;

use klog_core::{klog_error, klog_info};
use klog_hal::HAL;

use crate::dev::{IRQ_CONSOLE, IRQ_TIMER};
use crate::fs::OpenMode;
use crate::syscall::Process;
use crate::{Kernel, ProcessId};

impl Kernel {
    pub(crate) fn boot_sequence(self: &Arc<Self>) {
        let log = self.log();
        klog_info!(
            log,
            "boot",
            "klog ring {} records, level {}, {}",
            log.capacity(),
            log.level(),
            if log.is_enabled() { "enabled" } else { "disabled" }
        );
        klog_info!(log, "boot", "{} cpus online", self.config().ncpu);
        let files = self.files().file_count();
        klog_info!(log, "fs", "rootfs mounted, {} files", files);

        self.interrupt(IRQ_TIMER);
        self.interrupt(IRQ_CONSOLE);

        let init_pid = self.proc_register("init", ProcessId(0));
        self.hal().bind_current(init_pid.0);
        let init = Process::new(Arc::clone(self), init_pid);

        match init.fork("sh", run_shell) {
            Ok(_) => {
                if let Err(e) = init.wait() {
                    klog_error!(log, "boot", "init lost its shell: {}", e);
                }
            }
            Err(e) => klog_error!(log, "boot", "cannot start shell: {}", e),
        }

        self.interrupt(IRQ_TIMER);
        self.hal().unbind_current();
        klog_info!(log, "boot", "boot complete at tick {}", self.hal().now_ticks());
    }
}

/// The boot shell prints the message of the day and exits.
fn run_shell(sh: Process) -> i32 {
    let fd = match sh.open("etc/motd", OpenMode::Read) {
        Ok(fd) => fd,
        Err(_) => return 1,
    };
    let mut buf = [0u8; 64];
    let status = match sh.read(fd, &mut buf) {
        Ok(_) => 0,
        Err(_) => 1,
    };
    let _ = sh.close(fd);
    status
}
