//! klogtest: run the kernel log self-test suite
//!
//! Exits 1 if any case reports FAIL.

use std::process::ExitCode;

use clap::Parser;
use klog_tools::selftest::{self, Outcome};

#[derive(Parser)]
#[command(name = "klogtest")]
#[command(about = "Kernel logging system test suite")]
struct Cli {
    /// Increase diagnostic verbosity on stderr (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli: Cli = match klog_tools::parse_args() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    klog_tools::setup_logging(cli.verbose);

    let (_kernel, me) = klog_tools::start("klogtest");
    let mut stdout = std::io::stdout().lock();

    match selftest::run(&me, &mut stdout) {
        Ok(outcomes) if outcomes.iter().any(|(_, o)| *o == Outcome::Fail) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("klogtest: {e:#}");
            ExitCode::FAILURE
        }
    }
}
