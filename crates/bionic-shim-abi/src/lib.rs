//! # bionic-shim-abi
//!
//! `extern "C"` compatibility symbols for C libraries (notably Android's
//! Bionic) that lack `close_range`, `copy_file_range`, `preadv2`, `pwritev2`,
//! `getloadavg`, `fexecve`, the `getpwent` family and `sem_clockwait`.
//!
//! # Architecture
//!
//! ```text
//! cargo features -> build.rs (profile + syscall number) -> cfg(shim_profile)
//!                                                        -> exported symbols
//! ```
//!
//! Exactly one profile is active per build:
//! - **stub** (default): [`stub`] symbols are exported. Facilities with no
//!   safe emulation fail with `ENOSYS`; the password database is empty.
//! - **fallback**: [`fallback`] symbols are exported. `close_range` goes
//!   straight to the kernel by syscall number; `sem_clockwait` forwards to
//!   `sem_timedwait`.
//! - **native**: nothing is exported.
//!
//! Both implementations are always compiled as ordinary Rust functions so the
//! harness and tests can exercise them; only the active profile's functions
//! carry unmangled names, and only in release builds (debug and test binaries
//! must not interpose the host libc inside the test process).

#[cfg(not(any(target_os = "linux", target_os = "android")))]
compile_error!("bionic-shim-abi targets Linux and Android C libraries only");

#[macro_use]
mod macros;

pub mod config;
pub mod errno_abi;
pub mod fallback;
pub mod stub;

pub use config::{PROFILE, SYS_CLOSE_RANGE, SYS_CLOSE_RANGE_SOURCE, active_strategy};
