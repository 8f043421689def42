//! Kernel Log Sync Primitives - Consolidated Unsafe Code
//!
//! This crate contains ALL unsafe code of the kernel log engine, consolidated
//! into a single auditable location. The engine crates use
//! `#![forbid(unsafe_code)]` and reach shared mutable state only through the
//! safe wrappers defined here.
//!
//! # Module Organization
//!
//! - `spin` - `SpinLock<T>`: the single mutual-exclusion domain guarding the
//!   log ring, its statistics and the admission gate
//! - `loom_tests` - Concurrency models of the lock discipline (with `loom` feature)
//!
//! # Verification
//!
//! 1. **Loom tests** (`cargo test -p klog-sync --features loom`): exhaustive
//!    interleavings of writers, readers and clear
//! 2. **Unit tests**: threaded smoke tests on real atomics

#![no_std]

#[cfg(test)]
extern crate std;

pub mod spin;


pub use spin::{SpinLock, SpinLockGuard};
