//! logstress: file-write load generator
//!
//! One child process per named file. Each child creates its file and
//! writes it in fixed-size chunks, so the fs layer, the syscall layer and
//! the disk interrupt handler all log on every chunk.

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use klog_kernel::{OpenMode, Process};

use crate::client::KlogClient;
use crate::view::write_stats;

#[derive(Parser, Debug)]
#[command(name = "logstress")]
#[command(about = "Generate kernel log load from concurrent file writers")]
pub struct StressArgs {
    /// Files to create, one writer process each
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Writes per process
    #[arg(short = 'w', long, default_value_t = 250)]
    pub writes: usize,

    /// Bytes per write
    #[arg(short = 'b', long, default_value_t = 2000)]
    pub bytes: usize,

    /// Skip the statistics summary
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Increase diagnostic verbosity on stderr (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Child exit status when the file cannot be created.
pub const EXIT_CREATE_FAILED: i32 = 2;
/// Child exit status on a short or failed write.
pub const EXIT_WRITE_FAILED: i32 = 3;

/// Run the writers; returns the first non-zero child status, or 0.
///
/// A failed fork stops spawning; writers already running are still reaped
/// before the error is returned.
pub fn run<W: Write>(args: &StressArgs, me: &Process, out: &mut W) -> Result<i32> {
    let mut started = 0;
    let mut fork_error = None;
    for (i, path) in args.files.iter().enumerate() {
        let owned = path.clone();
        let fill = b'0'.wrapping_add((i + 1) as u8);
        let (writes, bytes) = (args.writes, args.bytes);
        match me.fork("logstress", move |p| write_file(&p, &owned, fill, writes, bytes)) {
            Ok(_) => started += 1,
            Err(e) => {
                fork_error = Some(anyhow::Error::new(e).context(format!("fork failed for {path}")));
                break;
            }
        }
    }

    let status = reap(me, started, out)?;
    if let Some(e) = fork_error {
        return Err(e);
    }

    if !args.quiet {
        let stats = KlogClient::new(me).stats()?;
        write_stats(out, &stats)?;
    }
    Ok(status)
}

fn reap<W: Write>(me: &Process, children: usize, out: &mut W) -> Result<i32> {
    let mut status = 0;
    for _ in 0..children {
        let (pid, code) = me.wait()?;
        if code != 0 {
            writeln!(out, "logstress: pid {pid} exited with status {code}")?;
            if status == 0 {
                status = code;
            }
        }
    }
    Ok(status)
}

fn write_file(p: &Process, path: &str, fill: u8, writes: usize, bytes: usize) -> i32 {
    let fd = match p.open(path, OpenMode::Create) {
        Ok(fd) => fd,
        Err(e) => {
            tracing::error!(path, error = %e, "create failed");
            return EXIT_CREATE_FAILED;
        }
    };
    let chunk = vec![fill; bytes];
    for _ in 0..writes {
        match p.write(fd, &chunk) {
            Ok(n) if n == bytes => {}
            Ok(n) => {
                tracing::error!(path, written = n, "short write");
                return EXIT_WRITE_FAILED;
            }
            Err(e) => {
                tracing::error!(path, error = %e, "write failed");
                return EXIT_WRITE_FAILED;
            }
        }
    }
    let _ = p.close(fd);
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use klog_kernel::{Kernel, KernelConfig, KernelError, NPROC};

    fn args(argv: &[&str]) -> StressArgs {
        StressArgs::parse_from(std::iter::once("logstress").chain(argv.iter().copied()))
    }

    #[test]
    fn test_writers_fill_files_and_wrap_ring() {
        let kernel = Kernel::boot(KernelConfig::default());
        let me = kernel.attach("logstress");
        let mut out = Vec::new();

        let status = run(&args(&["a", "b", "c", "-w", "50", "-b", "100"]), &me, &mut out).unwrap();
        assert_eq!(status, 0);
        for file in ["a", "b", "c"] {
            assert_eq!(kernel.file_size(file), Some(5000));
        }

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("=== Kernel Log Statistics ==="));
        // 150 writes, 3 records each, into a 256-slot ring.
        assert!(kernel.log().stats().buffer_wraps >= 1);
        assert_eq!(kernel.log().check_invariants(), Ok(()));
    }

    #[test]
    fn test_no_files_is_a_no_op() {
        let kernel = Kernel::boot(KernelConfig::default());
        let me = kernel.attach("logstress");
        let mut out = Vec::new();
        assert_eq!(run(&args(&["-q"]), &me, &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_fork_failure_reaps_started_writers() {
        let kernel = Kernel::boot(KernelConfig::default());
        let me = kernel.attach("logstress");
        let running = kernel.running_processes();
        let names: Vec<String> = (0..NPROC).map(|i| format!("f{i}")).collect();
        let mut argv: Vec<&str> = names.iter().map(String::as_str).collect();
        argv.extend(["-w", "1", "-b", "8", "-q"]);
        let mut out = Vec::new();

        let err = run(&args(&argv), &me, &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("fork failed for"));
        assert!(matches!(me.wait(), Err(KernelError::NoChildren)));
        assert_eq!(kernel.file_size("f0"), Some(8));
        assert_eq!(kernel.running_processes(), running);
    }

    #[test]
    fn test_defaults_match_classic_workload() {
        let parsed = args(&["x"]);
        assert_eq!(parsed.writes, 250);
        assert_eq!(parsed.bytes, 2000);
        assert_eq!(parsed.files, vec!["x".to_string()]);
    }
}
