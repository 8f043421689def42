//! Process lifecycle
//!
//! Every process runs on its own OS thread. `fork` starts the thread,
//! `exit` turns the entry into a zombie holding the status, `wait` reaps
//! one zombie child. Children of an exiting process are handed to init.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError};
use std::thread::{self, JoinHandle};

use klog_core::{klog_debug, klog_error, klog_info, klog_warn};

use crate::error::KernelError;
use crate::syscall::Process;
use crate::{Kernel, ProcessId, INIT_PID};

/// Exit status recorded for a process whose body panicked.
pub const EXIT_PANIC: i32 = 101;

/// Process table slots, zombies included.
pub const NPROC: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    /// Exited, not yet reaped
    Zombie(i32),
}

struct ProcEntry {
    name: String,
    parent: ProcessId,
    state: ProcessState,
    thread: Option<JoinHandle<()>>,
}

pub(crate) struct ProcessTable {
    entries: BTreeMap<ProcessId, ProcEntry>,
    next_pid: u32,
}

impl ProcessTable {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_pid: INIT_PID.0,
        }
    }

    fn register(&mut self, name: &str, parent: ProcessId) -> ProcessId {
        let pid = ProcessId(self.next_pid);
        self.next_pid += 1;
        self.entries.insert(
            pid,
            ProcEntry {
                name: name.to_string(),
                parent,
                state: ProcessState::Running,
                thread: None,
            },
        );
        pid
    }

    /// Register unless every slot is taken.
    fn try_register(&mut self, name: &str, parent: ProcessId) -> Option<ProcessId> {
        if self.entries.len() >= NPROC {
            return None;
        }
        Some(self.register(name, parent))
    }

    fn has_children(&self, parent: ProcessId) -> bool {
        self.entries.values().any(|e| e.parent == parent)
    }

    fn take_zombie_child(&mut self, parent: ProcessId) -> Option<(ProcessId, i32, Option<JoinHandle<()>>)> {
        let (&pid, code) = self.entries.iter().find_map(|(pid, e)| match e.state {
            ProcessState::Zombie(code) if e.parent == parent => Some((pid, code)),
            _ => None,
        })?;
        let entry = self.entries.remove(&pid)?;
        Some((pid, code, entry.thread))
    }

    /// Mark `pid` exited; returns its name and how many children moved to init.
    fn mark_exited(&mut self, pid: ProcessId, code: i32) -> Option<(String, usize)> {
        let entry = self.entries.get_mut(&pid)?;
        if entry.state != ProcessState::Running {
            return None;
        }
        entry.state = ProcessState::Zombie(code);
        let name = entry.name.clone();

        let mut orphans = 0;
        for child in self.entries.values_mut().filter(|e| e.parent == pid) {
            child.parent = INIT_PID;
            orphans += 1;
        }
        Some((name, orphans))
    }
}

impl Kernel {
    /// Create a process entry without starting a thread for it.
    pub(crate) fn proc_register(&self, name: &str, parent: ProcessId) -> ProcessId {
        let pid = self.procs().register(name, parent);
        klog_info!(self.log(), "proc", "spawn pid={} name={} parent={}", pid, name, parent);
        pid
    }

    pub(crate) fn proc_fork<F>(
        self: &Arc<Self>,
        parent: ProcessId,
        name: &str,
        body: F,
    ) -> Result<ProcessId, KernelError>
    where
        F: FnOnce(Process) -> i32 + Send + 'static,
    {
        let registered = self.procs().try_register(name, parent);
        let Some(child) = registered else {
            klog_warn!(self.log(), "proc", "fork {} refused: process table full", name);
            return Err(KernelError::ResourceExhausted);
        };

        let kernel = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name(format!("{name}:{child}"))
            .spawn(move || {
                kernel.hal().bind_current(child.0);
                let process = Process::new(Arc::clone(&kernel), child);
                let code = panic::catch_unwind(AssertUnwindSafe(|| body(process)))
                    .unwrap_or(EXIT_PANIC);
                kernel.proc_exit(child, code);
                kernel.hal().unbind_current();
            });

        match spawned {
            Ok(handle) => {
                if let Some(entry) = self.procs().entries.get_mut(&child) {
                    entry.thread = Some(handle);
                }
                klog_info!(self.log(), "proc", "fork parent={} child={} name={}", parent, child, name);
                Ok(child)
            }
            Err(e) => {
                self.procs().entries.remove(&child);
                klog_error!(self.log(), "proc", "fork {} failed: {}", name, e);
                Err(KernelError::ResourceExhausted)
            }
        }
    }

    /// Terminate `pid` with `code`. Exiting twice is a no-op.
    pub(crate) fn proc_exit(&self, pid: ProcessId, code: i32) {
        self.fs_release(pid);
        let exited = self.procs().mark_exited(pid, code);
        let Some((name, orphans)) = exited else {
            return;
        };
        self.child_exited.notify_all();

        if code == 0 {
            klog_info!(self.log(), "proc", "exit pid={} name={} status=0", pid, name);
        } else {
            klog_warn!(self.log(), "proc", "exit pid={} name={} status={}", pid, name, code);
        }
        if orphans > 0 {
            klog_debug!(self.log(), "proc", "reparented {} children of pid={} to init", orphans, pid);
        }
    }

    /// Block until a child of `parent` exits, then reap it.
    pub(crate) fn proc_wait(&self, parent: ProcessId) -> Result<(ProcessId, i32), KernelError> {
        let mut table = self.procs();
        loop {
            if let Some((child, code, thread)) = table.take_zombie_child(parent) {
                drop(table);
                if let Some(thread) = thread {
                    // The child already recorded its status; only the thread
                    // teardown remains.
                    let _ = thread.join();
                }
                klog_debug!(self.log(), "proc", "wait pid={} reaped child={} status={}", parent, child, code);
                return Ok((child, code));
            }
            if !table.has_children(parent) {
                return Err(KernelError::NoChildren);
            }
            table = self
                .child_exited
                .wait(table)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn process_state(&self, pid: ProcessId) -> Option<ProcessState> {
        self.procs().entries.get(&pid).map(|e| e.state)
    }

    /// Processes that have not exited yet.
    pub fn running_processes(&self) -> usize {
        self.procs()
            .entries
            .values()
            .filter(|e| e.state == ProcessState::Running)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pids_start_at_init() {
        let mut table = ProcessTable::new();
        assert_eq!(table.register("init", ProcessId(0)), INIT_PID);
        assert_eq!(table.register("sh", INIT_PID), ProcessId(2));
    }

    #[test]
    fn test_table_full_refuses_register() {
        let mut table = ProcessTable::new();
        for _ in 0..NPROC {
            assert!(table.try_register("p", INIT_PID).is_some());
        }
        assert_eq!(table.try_register("one-too-many", INIT_PID), None);

        assert!(table.mark_exited(ProcessId(2), 0).is_some());
        assert_eq!(table.take_zombie_child(INIT_PID).map(|(pid, ..)| pid), Some(ProcessId(2)));
        assert!(table.try_register("fits-again", INIT_PID).is_some());
    }

    #[test]
    fn test_exit_reparents_children() {
        let mut table = ProcessTable::new();
        let init = table.register("init", ProcessId(0));
        let sh = table.register("sh", init);
        let child = table.register("job", sh);

        assert_eq!(table.mark_exited(sh, 3), Some(("sh".to_string(), 1)));
        assert_eq!(table.entries[&child].parent, init);
        assert_eq!(table.mark_exited(sh, 4), None);

        let (pid, code, _) = table.take_zombie_child(init).unwrap();
        assert_eq!((pid, code), (sh, 3));
        assert!(table.has_children(init));
        assert!(table.take_zombie_child(init).is_none());
    }
}
