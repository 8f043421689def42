//! Logging macros
//!
//! Call-site entry points for kernel code. Each macro captures `file!()` and
//! `line!()` at the call site, formats into the record's inline message
//! field and discards the outcome: instrumented code never learns whether
//! its record was stored.
//!
//! ```ignore
//! klog_info!(kernel.log(), "proc", "fork parent={} child={}", parent, child);
//! ```

/// Log at an explicit level.
#[macro_export]
macro_rules! klog {
    ($log:expr, $level:expr, $subsys:expr, $($arg:tt)+) => {{
        let _ = ($log).log(
            &$crate::CallSite::new($level, $subsys, file!(), line!()),
            format_args!($($arg)+),
        );
    }};
}

#[macro_export]
macro_rules! klog_debug {
    ($log:expr, $subsys:expr, $($arg:tt)+) => {
        $crate::klog!($log, $crate::LogLevel::Debug, $subsys, $($arg)+)
    };
}

#[macro_export]
macro_rules! klog_info {
    ($log:expr, $subsys:expr, $($arg:tt)+) => {
        $crate::klog!($log, $crate::LogLevel::Info, $subsys, $($arg)+)
    };
}

#[macro_export]
macro_rules! klog_warn {
    ($log:expr, $subsys:expr, $($arg:tt)+) => {
        $crate::klog!($log, $crate::LogLevel::Warn, $subsys, $($arg)+)
    };
}

#[macro_export]
macro_rules! klog_error {
    ($log:expr, $subsys:expr, $($arg:tt)+) => {
        $crate::klog!($log, $crate::LogLevel::Error, $subsys, $($arg)+)
    };
}

#[macro_export]
macro_rules! klog_fatal {
    ($log:expr, $subsys:expr, $($arg:tt)+) => {
        $crate::klog!($log, $crate::LogLevel::Fatal, $subsys, $($arg)+)
    };
}
