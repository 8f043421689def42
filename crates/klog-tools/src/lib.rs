//! User programs for the kernel log
//!
//! Each program boots a hosted kernel, attaches itself as a user process
//! and drives the log through `klogctl` alone.
//!
//! ## Programs
//!
//! ```bash
//! # List the log, last 20 WARN-or-worse records from fs
//! klogview -n 20 -l WARN -s fs
//!
//! # Statistics, then clear
//! klogview -t -c
//!
//! # Seven-case self-test
//! klogtest
//!
//! # Three concurrent writers
//! logstress a b c
//! ```

pub mod client;
pub mod selftest;
pub mod stress;
pub mod view;

use std::process::ExitCode;

use clap::error::ErrorKind;
use klog_kernel::{Kernel, KernelConfig, Process};
use std::sync::Arc;

/// Install the stderr subscriber; `RUST_LOG` overrides `verbosity`.
pub fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

/// Boot a kernel configured from the environment and attach as `name`.
pub fn start(name: &str) -> (Arc<Kernel>, Process) {
    let kernel = Kernel::boot(KernelConfig::from_env());
    let me = kernel.attach(name);
    (kernel, me)
}

/// Parse argv, mapping every usage error to exit status 1.
///
/// `-h` prints help and yields `Err(ExitCode::SUCCESS)`.
pub fn parse_args<T: clap::Parser>() -> Result<T, ExitCode> {
    T::try_parse().map_err(|e| {
        let _ = e.print();
        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        }
    })
}
