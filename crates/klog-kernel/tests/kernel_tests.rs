//! Hosted kernel integration tests
//!
//! Each test boots its own kernel and checks what the subsystems left in
//! the log.

use std::sync::Arc;

use klog_core::{KlogConfig, LogLevel, LogRecord, KLOG_CMD_GET_COUNT, LOG_RING_SIZE};
use klog_kernel::{
    Kernel, KernelConfig, KernelError, OpenMode, ProcessState, EXIT_PANIC, INIT_PID, IRQ_DISK,
    IRQ_TIMER,
};

fn boot() -> Arc<Kernel> {
    Kernel::boot(KernelConfig::default().with_ncpu(4))
}

fn records(kernel: &Kernel) -> Vec<LogRecord> {
    let mut out = vec![LogRecord::EMPTY; LOG_RING_SIZE];
    let n = kernel.log().read_batch(&mut out, LOG_RING_SIZE);
    out.truncate(n);
    out
}

fn with_subsystem<'a>(records: &'a [LogRecord], tag: &'a str) -> impl Iterator<Item = &'a LogRecord> {
    records.iter().filter(move |r| r.subsystem.as_str() == tag)
}

#[test]
fn test_boot_logs_every_subsystem() {
    let kernel = boot();
    let recs = records(&kernel);

    for tag in ["boot", "fs", "proc", "dev", "syscall"] {
        assert!(with_subsystem(&recs, tag).count() > 0, "no {tag} records");
    }
    let last = recs.last().unwrap();
    assert!(last.message.as_str().starts_with("boot complete"));
    assert_eq!(last.pid, 0);
    assert!(recs.iter().all(|r| r.cpu_id < 4));
    assert_eq!(kernel.log().check_invariants(), Ok(()));
}

#[test]
fn test_fork_wait_exit_status() {
    let kernel = boot();
    let me = kernel.attach("tester");

    let child = me.fork("child", |_| 7).unwrap();
    assert_eq!(me.wait(), Ok((child, 7)));
    assert_eq!(me.wait(), Err(KernelError::NoChildren));
    assert_eq!(kernel.process_state(child), None);

    let recs = records(&kernel);
    let exit = with_subsystem(&recs, "proc")
        .find(|r| r.message.as_str().contains(&format!("exit pid={child}")))
        .unwrap();
    assert_eq!(exit.level, LogLevel::Warn);
    assert_eq!(exit.pid, child.0);
}

#[test]
fn test_child_records_carry_child_pid() {
    let kernel = boot();
    let me = kernel.attach("tester");
    let child = me
        .fork("reader", |p| {
            let fd = match p.open("README", OpenMode::Read) {
                Ok(fd) => fd,
                Err(_) => return 1,
            };
            let mut buf = [0u8; 32];
            let _ = p.read(fd, &mut buf);
            let _ = p.close(fd);
            0
        })
        .unwrap();
    assert_eq!(me.wait(), Ok((child, 0)));

    let recs = records(&kernel);
    let opens: Vec<_> = with_subsystem(&recs, "fs")
        .filter(|r| r.message.as_str().starts_with("open README"))
        .collect();
    assert_eq!(opens.len(), 1);
    assert_eq!(opens[0].pid, child.0);
    assert_eq!(opens[0].file, "fs.rs");
}

#[test]
fn test_panicking_child_is_reaped() {
    let kernel = boot();
    let me = kernel.attach("tester");
    let child = me.fork("crasher", |_| panic!("boom")).unwrap();
    assert_eq!(me.wait(), Ok((child, EXIT_PANIC)));
}

#[test]
fn test_orphans_move_to_init() {
    let kernel = boot();
    let me = kernel.attach("tester");
    let (tx, rx) = std::sync::mpsc::channel();

    let parent = me
        .fork("parent", move |p| {
            let grandchild = p.fork("sleeper", |_| {
                std::thread::sleep(std::time::Duration::from_millis(20));
                0
            });
            let _ = tx.send(grandchild);
            0
        })
        .unwrap();
    assert_eq!(me.wait(), Ok((parent, 0)));

    let grandchild = rx.recv().unwrap().unwrap();
    assert_ne!(kernel.process_state(grandchild), None);
    assert_eq!(me.wait(), Err(KernelError::NoChildren));
    assert_ne!(grandchild, INIT_PID);
}

#[test]
fn test_exit_closes_leaked_descriptors() {
    let kernel = boot();
    let me = kernel.attach("tester");
    let child = me
        .fork("leaker", |p| match p.open("README", OpenMode::Read) {
            Ok(_) => 0,
            Err(_) => 1,
        })
        .unwrap();
    assert_eq!(me.wait(), Ok((child, 0)));

    let recs = records(&kernel);
    assert!(with_subsystem(&recs, "fs")
        .any(|r| r.message.as_str().contains("exited with 1 open files")));
}

#[test]
fn test_writes_raise_disk_interrupts() {
    let kernel = boot();
    let me = kernel.attach("writer");
    let before = kernel.interrupt_count(IRQ_DISK);

    let fd = me.open("out.txt", OpenMode::Create).unwrap();
    me.write(fd, b"abc").unwrap();
    me.write(fd, b"def").unwrap();
    me.close(fd).unwrap();

    assert_eq!(kernel.interrupt_count(IRQ_DISK), before + 2);
    assert_eq!(kernel.file_size("out.txt"), Some(6));

    let recs = records(&kernel);
    let disk = with_subsystem(&recs, "dev")
        .filter(|r| r.message.as_str().starts_with("disk"))
        .last()
        .unwrap();
    assert_eq!(disk.pid, 0);
}

#[test]
fn test_interrupt_restores_process_binding() {
    let kernel = boot();
    let me = kernel.attach("tester");
    kernel.interrupt(IRQ_TIMER);
    kernel.interrupt(200);

    let fd = me.open("README", OpenMode::Read).unwrap();
    me.close(fd).unwrap();
    let recs = records(&kernel);
    let open = recs
        .iter()
        .rev()
        .find(|r| r.message.as_str().starts_with("open README"))
        .unwrap();
    assert_eq!(open.pid, me.pid().0);
    assert!(recs
        .iter()
        .any(|r| r.level == LogLevel::Warn && r.message.as_str() == "unexpected interrupt irq=200"));
}

#[test]
fn test_file_errors_are_logged_not_fatal() {
    let kernel = boot();
    let me = kernel.attach("tester");
    assert_eq!(me.open("nope", OpenMode::Read), Err(KernelError::FileNotFound));
    let fd = me.open("README", OpenMode::Read).unwrap();
    assert_eq!(me.write(fd, b"x"), Err(KernelError::PermissionDenied));

    let recs = records(&kernel);
    assert!(with_subsystem(&recs, "fs").any(|r| r.level == LogLevel::Warn));
    assert_eq!(kernel.process_state(me.pid()), Some(ProcessState::Running));
}

#[test]
fn test_klogctl_through_process() {
    let kernel = Kernel::boot(
        KernelConfig::default().with_log(KlogConfig::DEFAULT.with_min_level(LogLevel::Info)),
    );
    let me = kernel.attach("tester");
    let count = me.klogctl(KLOG_CMD_GET_COUNT, &mut [], 0);
    assert_eq!(count, kernel.log().count() as i64);
    assert!(records(&kernel).iter().all(|r| r.level >= LogLevel::Info));
    assert!(kernel.log().stats().dropped_logs > 0);
}
