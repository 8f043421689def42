//! klogtest: end-to-end self-test of the kernel log
//!
//! Seven cases run in a fixed order against the live kernel. Each reports
//! PASS, WARN (the engine behaved, but the workload did not show it) or
//! FAIL (a control call misbehaved). Any FAIL makes the run fail.

use std::io::Write;

use anyhow::Result;
use klog_core::LogLevel;
use klog_kernel::{OpenMode, Process};

use crate::client::KlogClient;
use crate::view::write_stats;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Warn,
    Fail,
}

/// Children forked by the stress case.
pub const STRESS_CHILDREN: usize = 10;
/// README opens per stress child.
pub const STRESS_OPENS: usize = 10;

struct Suite<'a, W: Write> {
    me: &'a Process,
    client: KlogClient<'a>,
    out: &'a mut W,
}

/// Run every case; returns the outcomes in execution order.
pub fn run<W: Write>(me: &Process, out: &mut W) -> Result<Vec<(&'static str, Outcome)>> {
    let mut suite = Suite {
        me,
        client: KlogClient::new(me),
        out,
    };

    writeln!(suite.out, "=================================")?;
    writeln!(suite.out, "Kernel Logging System Test Suite")?;
    writeln!(suite.out, "=================================")?;

    let mut outcomes = Vec::with_capacity(7);
    outcomes.push(("basic logging", suite.basic_logging()?));
    outcomes.push(("log levels", suite.log_levels()?));
    outcomes.push(("read logs", suite.read_logs()?));
    outcomes.push(("statistics", suite.statistics()?));
    outcomes.push(("enable/disable", suite.enable_disable()?));
    outcomes.push(("clear", suite.clear_logs()?));
    outcomes.push(("stress", suite.stress()?));
    for (name, outcome) in &outcomes {
        tracing::info!(case = name, ?outcome, "klogtest case finished");
    }

    writeln!(suite.out)?;
    writeln!(suite.out, "=================================")?;
    writeln!(suite.out, "All tests completed!")?;
    writeln!(suite.out, "=================================")?;
    Ok(outcomes)
}

impl<W: Write> Suite<'_, W> {
    fn header(&mut self, title: &str) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "=== {title} ===")?;
        Ok(())
    }

    fn report(&mut self, outcome: Outcome, msg: &str) -> Result<Outcome> {
        let tag = match outcome {
            Outcome::Pass => "PASS",
            Outcome::Warn => "WARN",
            Outcome::Fail => "FAIL",
        };
        writeln!(self.out, "{tag}: {msg}")?;
        Ok(outcome)
    }

    /// Fork `n` children that exit at once, then reap them all.
    fn fork_and_reap(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.me.fork("klogtest-child", |_| 0)?;
        }
        for _ in 0..n {
            self.me.wait()?;
        }
        Ok(())
    }

    fn basic_logging(&mut self) -> Result<Outcome> {
        self.header("Test 1: Basic Logging")?;
        let Ok(before) = self.client.count() else {
            return self.report(Outcome::Fail, "Could not get log count");
        };
        writeln!(self.out, "Initial log count: {before}")?;

        self.fork_and_reap(1)?;

        let Ok(after) = self.client.count() else {
            return self.report(Outcome::Fail, "Could not get log count");
        };
        writeln!(self.out, "New log count: {after}")?;
        if after > before {
            self.report(Outcome::Pass, "Logs were generated")
        } else {
            self.report(Outcome::Warn, "No new logs generated")
        }
    }

    fn log_levels(&mut self) -> Result<Outcome> {
        self.header("Test 2: Log Level Filtering")?;
        let Ok(current) = self.client.level() else {
            return self.report(Outcome::Fail, "Could not get log level");
        };
        writeln!(self.out, "Current log level: {}", current as u8)?;

        if self.client.set_level(LogLevel::Error).is_err() {
            return self.report(Outcome::Fail, "Could not set log level");
        }
        writeln!(self.out, "Set log level to ERROR (3)")?;

        let outcome = match self.client.level() {
            Ok(LogLevel::Error) => self.report(Outcome::Pass, "Log level changed successfully"),
            Ok(other) => self.report(
                Outcome::Fail,
                &format!("Log level not changed (got {})", other as u8),
            ),
            Err(e) => self.report(Outcome::Fail, &format!("Could not read log level: {e}")),
        };
        self.client.set_level(current)?;
        outcome
    }

    fn read_logs(&mut self) -> Result<Outcome> {
        self.header("Test 4: Read Log Entries")?;
        self.client.clear()?;
        self.fork_and_reap(5)?;

        let records = match self.client.read(50) {
            Ok(records) => records,
            Err(e) => return self.report(Outcome::Fail, &format!("Could not read logs: {e}")),
        };
        writeln!(self.out, "Read {} log entries", records.len())?;
        if records.is_empty() {
            return self.report(Outcome::Warn, "No logs read");
        }
        let outcome = self.report(Outcome::Pass, "Successfully read logs")?;
        writeln!(self.out, "Sample entries:")?;
        for record in records.iter().take(5) {
            writeln!(
                self.out,
                "  [{}] {}: {}",
                record.subsystem, record.file, record.message
            )?;
        }
        Ok(outcome)
    }

    fn statistics(&mut self) -> Result<Outcome> {
        self.header("Test 5: Log Statistics")?;
        match self.client.stats() {
            Ok(stats) => {
                write_stats(&mut *self.out, &stats)?;
                if stats.logs_by_level.iter().sum::<u64>() != stats.total_logs {
                    return self.report(Outcome::Fail, "Per-level counts do not add up");
                }
                self.report(Outcome::Pass, "Statistics retrieved")
            }
            Err(e) => self.report(Outcome::Fail, &format!("Could not get statistics: {e}")),
        }
    }

    fn enable_disable(&mut self) -> Result<Outcome> {
        self.header("Test 6: Enable/Disable Logging")?;
        if self.client.disable().is_err() {
            return self.report(Outcome::Fail, "Could not disable logging");
        }
        writeln!(self.out, "Logging disabled")?;

        let before = self.client.count()?;
        self.fork_and_reap(1)?;
        let after = self.client.count()?;

        if self.client.enable().is_err() {
            return self.report(Outcome::Fail, "Could not enable logging");
        }
        writeln!(self.out, "Logging re-enabled")?;

        if before == after {
            self.report(Outcome::Pass, "No logs generated while disabled")
        } else {
            self.report(
                Outcome::Warn,
                &format!("Logs still generated ({before} vs {after})"),
            )
        }
    }

    fn clear_logs(&mut self) -> Result<Outcome> {
        self.header("Test 3: Clear Log Buffer")?;
        writeln!(self.out, "Logs before clear: {}", self.client.count()?)?;
        if self.client.clear().is_err() {
            return self.report(Outcome::Fail, "Could not clear logs");
        }
        let after = self.client.count()?;
        writeln!(self.out, "Logs after clear: {after}")?;
        if after == 0 {
            self.report(Outcome::Pass, "Logs cleared successfully")
        } else {
            self.report(Outcome::Fail, "Logs not fully cleared")
        }
    }

    fn stress(&mut self) -> Result<Outcome> {
        self.header("Test 7: Stress Test (Multiple Processes)")?;
        self.client.clear()?;
        writeln!(
            self.out,
            "Spawning {STRESS_CHILDREN} processes to generate logs..."
        )?;

        for _ in 0..STRESS_CHILDREN {
            self.me.fork("klogtest-stress", |p| {
                for _ in 0..STRESS_OPENS {
                    if let Ok(fd) = p.open("README", OpenMode::Read) {
                        let mut buf = [0u8; 64];
                        let _ = p.read(fd, &mut buf);
                        let _ = p.close(fd);
                    }
                }
                0
            })?;
        }
        for _ in 0..STRESS_CHILDREN {
            self.me.wait()?;
        }

        let count = self.client.count()?;
        writeln!(self.out, "Final log count: {count}")?;
        let stats = self.client.stats()?;
        writeln!(self.out, "Total logs written: {}", stats.total_logs)?;
        writeln!(self.out, "Dropped logs: {}", stats.dropped_logs)?;
        if count > 0 {
            self.report(Outcome::Pass, "Stress test completed")
        } else {
            self.report(Outcome::Warn, "No logs generated during stress test")
        }
    }
}
