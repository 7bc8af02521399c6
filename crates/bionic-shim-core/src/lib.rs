//! # bionic-shim-core
//!
//! Safe, build-time model of the compatibility shim.
//!
//! This crate knows which libc symbols the shim can replace, which strategy
//! each symbol takes under a given [`Profile`], and which numeric syscall
//! identifier a raw fallback must use on a given target architecture. It is
//! consumed both by `bionic-shim-abi`'s `build.rs` (to resolve and validate the
//! build configuration) and at run time by tooling that reports on it.
//!
//! No `unsafe` code is permitted at the crate level.

#![deny(unsafe_code)]

pub mod error;
pub mod profile;
pub mod symbol;
pub mod syscall_table;

pub use error::ConfigError;
pub use profile::{ErrorPolicy, Profile, Strategy};
pub use symbol::{ShimSymbol, SymbolFamily};
pub use syscall_table::{Arch, NumberSource, Resolution, SyscallOp};
