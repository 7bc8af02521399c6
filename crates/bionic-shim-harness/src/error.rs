//! Harness error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] bionic_shim_core::ConfigError),
    #[error("{failed} of {total} conformance checks failed")]
    ChecksFailed { failed: usize, total: usize },
    #[error("{errors} invalid entries in {lines} log lines")]
    InvalidLog { lines: usize, errors: usize },
}
