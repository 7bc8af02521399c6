//! Numeric syscall identifiers for operations whose library wrapper may be
//! missing.
//!
//! Raw syscall numbers are an external ABI: they differ between processor
//! architectures (and between MIPS ABIs). The table is keyed by
//! `(Arch, SyscallOp)` and consulted by `bionic-shim-abi`'s `build.rs`. An
//! unknown pair is a build failure unless the number is supplied explicitly.
//!
//! Since Linux 5.1 new syscalls share one number across the unified tables, so
//! most architectures agree; MIPS offsets each ABI by a fixed base.

use std::fmt;

use crate::error::ConfigError;
use crate::profile::{Profile, Strategy};
use crate::symbol::ShimSymbol;

/// Historical fallback number for `close_range` (the unified-table value).
pub const DEFAULT_CLOSE_RANGE_NR: u32 = 436;

/// Build-time environment override for the `close_range` number.
pub const CLOSE_RANGE_OVERRIDE_ENV: &str = "BIONIC_SHIM_SYS_CLOSE_RANGE";

/// Target architectures with a known syscall table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    X86,
    Aarch64,
    Arm,
    Riscv32,
    Riscv64,
    Loongarch64,
    Powerpc,
    Powerpc64,
    S390x,
    Sparc,
    Sparc64,
    /// MIPS o32.
    MipsO32,
    /// MIPS n64.
    MipsN64,
    /// MIPS n32.
    MipsN32,
}

impl Arch {
    /// Parse a `target_arch` name. `pointer_width` disambiguates MIPS n32
    /// (64-bit registers, 32-bit pointers) from n64.
    #[must_use]
    pub fn from_target(arch: &str, pointer_width: u32) -> Option<Self> {
        Some(match arch {
            "x86_64" if pointer_width == 64 => Self::X86_64,
            "x86" => Self::X86,
            "aarch64" => Self::Aarch64,
            "arm" => Self::Arm,
            "riscv32" => Self::Riscv32,
            "riscv64" => Self::Riscv64,
            "loongarch64" => Self::Loongarch64,
            "powerpc" => Self::Powerpc,
            "powerpc64" => Self::Powerpc64,
            "s390x" => Self::S390x,
            "sparc" => Self::Sparc,
            "sparc64" => Self::Sparc64,
            "mips" | "mips32r6" => Self::MipsO32,
            "mips64" | "mips64r6" if pointer_width == 32 => Self::MipsN32,
            "mips64" | "mips64r6" => Self::MipsN64,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::X86 => "x86",
            Self::Aarch64 => "aarch64",
            Self::Arm => "arm",
            Self::Riscv32 => "riscv32",
            Self::Riscv64 => "riscv64",
            Self::Loongarch64 => "loongarch64",
            Self::Powerpc => "powerpc",
            Self::Powerpc64 => "powerpc64",
            Self::S390x => "s390x",
            Self::Sparc => "sparc",
            Self::Sparc64 => "sparc64",
            Self::MipsO32 => "mips-o32",
            Self::MipsN64 => "mips-n64",
            Self::MipsN32 => "mips-n32",
        }
    }

    /// Offset added to unified syscall numbers on this architecture.
    const fn unified_base(self) -> u32 {
        match self {
            Self::MipsO32 => 4000,
            Self::MipsN64 => 5000,
            Self::MipsN32 => 6000,
            _ => 0,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kernel operations invoked by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyscallOp {
    CloseRange,
}

impl SyscallOp {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CloseRange => "close_range",
        }
    }

    /// The shim symbol implemented by issuing this syscall.
    #[must_use]
    pub const fn symbol(self) -> ShimSymbol {
        match self {
            Self::CloseRange => ShimSymbol::CloseRange,
        }
    }

    /// Build-time environment variable that overrides the table.
    #[must_use]
    pub const fn override_env(self) -> &'static str {
        match self {
            Self::CloseRange => CLOSE_RANGE_OVERRIDE_ENV,
        }
    }

    /// Number in the unified syscall table.
    const fn unified_nr(self) -> u32 {
        match self {
            Self::CloseRange => DEFAULT_CLOSE_RANGE_NR,
        }
    }
}

/// Syscall number for `op` on `arch`.
#[must_use]
pub const fn lookup(arch: Arch, op: SyscallOp) -> u32 {
    arch.unified_base() + op.unified_nr()
}

/// Resolve the syscall number for a raw `target_arch` name.
///
/// `override_value` (the contents of [`SyscallOp::override_env`], if set) wins
/// over the table. An architecture missing from the table with no override is
/// an error; guessing would invoke an unrelated kernel operation.
pub fn resolve(
    arch: &str,
    pointer_width: u32,
    op: SyscallOp,
    override_value: Option<&str>,
) -> Result<u32, ConfigError> {
    if let Some(raw) = override_value {
        return parse_override(op, raw);
    }
    Arch::from_target(arch, pointer_width)
        .map(|a| lookup(a, op))
        .ok_or_else(|| ConfigError::UnknownSyscall {
            arch: arch.to_string(),
            op: op.name(),
            env: op.override_env(),
        })
}

/// Where a build's syscall number came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberSource {
    /// The `(Arch, SyscallOp)` table.
    Table,
    /// The build-time environment override.
    Override,
    /// No number: the architecture is unknown and the profile never issues
    /// the raw syscall.
    Unavailable,
}

impl NumberSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Override => "override",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Syscall number resolved for one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub nr: Option<u32>,
    pub source: NumberSource,
}

/// Resolve `op`'s number for a build of `profile`.
///
/// An architecture missing from the table is only an error when `profile`
/// implements `op`'s symbol as a raw syscall; otherwise the number is
/// recorded as [`NumberSource::Unavailable`]. A malformed override is always
/// an error.
pub fn resolve_for_profile(
    profile: Profile,
    arch: &str,
    pointer_width: u32,
    op: SyscallOp,
    override_value: Option<&str>,
) -> Result<Resolution, ConfigError> {
    match resolve(arch, pointer_width, op, override_value) {
        Ok(nr) => Ok(Resolution {
            nr: Some(nr),
            source: if override_value.is_some() {
                NumberSource::Override
            } else {
                NumberSource::Table
            },
        }),
        Err(ConfigError::UnknownSyscall { .. })
            if profile.strategy(op.symbol()) != Strategy::RawSyscall =>
        {
            Ok(Resolution {
                nr: None,
                source: NumberSource::Unavailable,
            })
        }
        Err(err) => Err(err),
    }
}

fn parse_override(op: SyscallOp, raw: &str) -> Result<u32, ConfigError> {
    let trimmed = raw.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };
    match parsed {
        Ok(nr) if nr > 0 => Ok(nr),
        _ => Err(ConfigError::InvalidOverride {
            env: op.override_env(),
            value: raw.to_string(),
        }),
    }
}
