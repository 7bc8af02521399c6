//! Build configuration errors.

use thiserror::Error;

/// Reasons a shim build configuration cannot be resolved.
///
/// These surface from `build.rs`, so every variant is a hard build failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "features `stub` and `fallback` are mutually exclusive: both define `close_range` and `sem_clockwait`"
    )]
    ConflictingProfiles,
    #[error("unknown shim profile: '{0}' (expected stub, fallback or native)")]
    UnknownProfile(String),
    #[error(
        "no syscall number known for {op} on target arch '{arch}'; set {env} to the architecture-correct value"
    )]
    UnknownSyscall {
        arch: String,
        op: &'static str,
        env: &'static str,
    },
    #[error("invalid {env} override '{value}': expected a positive integer")]
    InvalidOverride { env: &'static str, value: String },
}
