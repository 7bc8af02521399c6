//! Conformance harness for bionic-shim.
//!
//! This crate provides:
//! - Build reporting: which profile was compiled in, the resolved syscall
//!   number, and the strategy each symbol takes
//! - Conformance checks: call the stub and fallback implementations and
//!   compare return values and `errno` against their contracts
//! - Structured JSONL logging for every check
//! - Report generation with a SHA-256 digest for artifact tracking

#![deny(unsafe_code)]

// Checks call the extern "C" implementations directly.
#[allow(unsafe_code)]
pub mod conformance;
pub mod error;
pub mod report;
pub mod structured_log;

pub use conformance::CheckResult;
pub use error::HarnessError;
pub use report::{BuildReport, ConformanceReport};
