//! klogview: the kernel log inspector
//!
//! Actions run in a fixed order regardless of flag order: set threshold,
//! enable, disable, statistics, clear, then the listing. `-c` alone stops
//! after clearing; `-c -n N` clears and then lists what is left.
//!
//! With `-j`, statistics and records are written as one JSON object per
//! line and the confirmation messages are suppressed.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use klog_core::{LogLevel, LogRecord, Stats};

use crate::client::{LogControl, READ_BATCH};

#[derive(Parser, Debug, Default)]
#[command(name = "klogview")]
#[command(about = "Inspect and control the kernel log")]
pub struct ViewArgs {
    /// Clear the log buffer
    #[arg(short = 'c')]
    pub clear: bool,

    /// Show only logs at or above LEVEL (DEBUG/0 .. FATAL/4)
    #[arg(short = 'l', value_name = "LEVEL", value_parser = parse_level)]
    pub min_level: Option<LogLevel>,

    /// Show only logs from SUBSYS
    #[arg(short = 's', value_name = "SUBSYS")]
    pub subsystem: Option<String>,

    /// Show only the last COUNT entries
    #[arg(short = 'n', value_name = "COUNT")]
    pub last: Option<usize>,

    /// Show statistics
    #[arg(short = 't')]
    pub stats: bool,

    /// Set kernel log level
    #[arg(short = 'L', value_name = "LEVEL", value_parser = parse_level)]
    pub set_level: Option<LogLevel>,

    /// Enable kernel logging
    #[arg(short = 'e')]
    pub enable: bool,

    /// Disable kernel logging
    #[arg(short = 'd')]
    pub disable: bool,

    /// Emit JSON lines instead of text
    #[arg(short = 'j')]
    pub json: bool,

    /// Increase diagnostic verbosity on stderr (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_level(s: &str) -> Result<LogLevel, String> {
    s.parse().map_err(|_| format!("Invalid log level: {s}"))
}

/// Run the inspector against `client`, writing its report to `out`.
pub fn run<C: LogControl, W: Write>(args: &ViewArgs, client: &C, out: &mut W) -> Result<()> {
    if let Some(level) = args.set_level {
        client.set_level(level).context("Failed to set log level")?;
        if !args.json {
            writeln!(out, "Kernel log level set to {level:<5}")?;
        }
    }

    if args.enable {
        client.enable().context("Failed to enable logging")?;
        if !args.json {
            writeln!(out, "Kernel logging enabled")?;
        }
    }

    if args.disable {
        client.disable().context("Failed to disable logging")?;
        if !args.json {
            writeln!(out, "Kernel logging disabled")?;
        }
    }

    if args.stats {
        let stats = client.stats().context("Failed to get statistics")?;
        if args.json {
            writeln!(out, "{}", serde_json::to_string(&stats)?)?;
        } else {
            write_stats(out, &stats)?;
            if args.clear || args.last.is_some() {
                writeln!(out)?;
            }
        }
    }

    if args.clear {
        client.clear().context("Failed to clear log")?;
        if !args.json {
            writeln!(out, "Kernel log cleared")?;
        }
        if args.last.is_none() {
            return Ok(());
        }
    }

    list(args, client, out)
}

fn list<C: LogControl, W: Write>(args: &ViewArgs, client: &C, out: &mut W) -> Result<()> {
    let count = client.count().context("Failed to get log count")?;
    if count == 0 {
        if !args.json {
            writeln!(out, "No kernel logs available")?;
        }
        return Ok(());
    }

    let records = client
        .read(count.min(READ_BATCH))
        .context("Failed to read logs")?;
    tracing::debug!(count, read = records.len(), "read kernel log");

    let start = match args.last {
        Some(n) if n < records.len() => records.len() - n,
        _ => 0,
    };
    let min_level = args.min_level.unwrap_or(LogLevel::Debug);
    let shown: Vec<&LogRecord> = records[start..]
        .iter()
        .filter(|r| r.level >= min_level)
        .filter(|r| args.subsystem.as_deref().map_or(true, |s| r.subsystem.as_str() == s))
        .collect();

    if args.json {
        for record in &shown {
            writeln!(out, "{}", serde_json::to_string(record)?)?;
        }
        return Ok(());
    }

    writeln!(out, "=== Kernel Log ({count} entries) ===")?;
    for record in &shown {
        writeln!(out, "{record}")?;
    }
    if shown.is_empty() {
        writeln!(out, "(No logs match the filter criteria)")?;
    }
    writeln!(out, "=== End of Log ({} shown) ===", shown.len())?;
    Ok(())
}

pub fn write_stats<W: Write>(out: &mut W, stats: &Stats) -> std::io::Result<()> {
    writeln!(out, "=== Kernel Log Statistics ===")?;
    writeln!(out, "Total logs written: {}", stats.total_logs)?;
    writeln!(out, "Dropped logs:       {}", stats.dropped_logs)?;
    writeln!(out, "Buffer wraps:       {}", stats.buffer_wraps)?;
    writeln!(out)?;
    writeln!(out, "Logs by level:")?;
    for level in LogLevel::ALL {
        let label = format!("{level}:");
        writeln!(out, "  {label:<6} {}", stats.level_count(level))?;
    }
    Ok(())
}
