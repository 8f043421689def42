//! logstress: one writer process per file, then a statistics summary

use std::process::ExitCode;

use klog_tools::stress::{self, StressArgs};

fn main() -> ExitCode {
    let args: StressArgs = match klog_tools::parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };
    klog_tools::setup_logging(args.verbose);

    let (_kernel, me) = klog_tools::start("logstress");
    let mut stdout = std::io::stdout().lock();

    match stress::run(&args, &me, &mut stdout) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(status) => ExitCode::from(u8::try_from(status).unwrap_or(1)),
        Err(e) => {
            eprintln!("logstress: {e:#}");
            ExitCode::FAILURE
        }
    }
}
