//! klogview: inspect and control the kernel log
//!
//! ```bash
//! klogview               # whole log
//! klogview -n 10 -l WARN # last ten, WARN and above
//! klogview -t -c         # statistics, then clear
//! klogview -L ERROR -d   # raise threshold, then disable
//! ```

use std::process::ExitCode;

use klog_tools::client::KlogClient;
use klog_tools::view::{self, ViewArgs};

fn main() -> ExitCode {
    let args: ViewArgs = match klog_tools::parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };
    klog_tools::setup_logging(args.verbose);

    let (_kernel, me) = klog_tools::start("klogview");
    let client = KlogClient::new(&me);
    let mut stdout = std::io::stdout().lock();

    match view::run(&args, &client, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("klogview: {e:#}");
            ExitCode::FAILURE
        }
    }
}
