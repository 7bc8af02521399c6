//! Build profiles and per-symbol strategy resolution.
//!
//! A profile is picked once, at build configuration time, through the
//! `bionic-shim-abi` cargo features:
//! - `stub` (default): every catalogued symbol is defined; facilities with no
//!   safe emulation fail with `ENOSYS`, the password database is empty, and
//!   `sem_clockwait` forwards to `sem_timedwait`.
//! - `fallback`: only `close_range` (raw syscall) and `sem_clockwait`
//!   (delegation) are defined; everything else is the platform's own symbol.
//! - neither: `native`, the shim defines nothing.
//!
//! `stub` and `fallback` define the same names with conflicting semantics, so
//! enabling both is a configuration error rather than a precedence rule.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::symbol::ShimSymbol;

/// The strategy set selected for a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Neutralize absent facilities.
    #[default]
    Stub,
    /// Make `close_range` and `sem_clockwait` work by going around the
    /// missing library wrappers.
    Fallback,
    /// Use the platform's symbols unchanged.
    Native,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Self::Stub, Self::Fallback, Self::Native];

    /// Resolve the profile from the enabled cargo features.
    pub fn from_features(stub: bool, fallback: bool) -> Result<Self, ConfigError> {
        match (stub, fallback) {
            (true, true) => Err(ConfigError::ConflictingProfiles),
            (true, false) => Ok(Self::Stub),
            (false, true) => Ok(Self::Fallback),
            (false, false) => Ok(Self::Native),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stub => "stub",
            Self::Fallback => "fallback",
            Self::Native => "native",
        }
    }

    /// Strategy `sym` takes under this profile.
    #[must_use]
    pub const fn strategy(self, sym: ShimSymbol) -> Strategy {
        match self {
            Self::Native => Strategy::Native,
            Self::Stub => match sym {
                ShimSymbol::CloseRange
                | ShimSymbol::CopyFileRange
                | ShimSymbol::Preadv2
                | ShimSymbol::Pwritev2
                | ShimSymbol::Getloadavg
                | ShimSymbol::Fexecve => Strategy::AlwaysFail,
                ShimSymbol::Setpwent | ShimSymbol::Endpwent => Strategy::NoOp,
                ShimSymbol::Getpwent => Strategy::Empty,
                ShimSymbol::SemClockwait => Strategy::Delegate,
            },
            Self::Fallback => match sym {
                ShimSymbol::CloseRange => Strategy::RawSyscall,
                ShimSymbol::SemClockwait => Strategy::Delegate,
                _ => Strategy::Native,
            },
        }
    }

    /// Symbols this profile defines (everything not left to the platform).
    pub fn defined_symbols(self) -> impl Iterator<Item = ShimSymbol> {
        ShimSymbol::ALL
            .into_iter()
            .filter(move |sym| self.strategy(*sym).is_defined())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stub" => Ok(Self::Stub),
            "fallback" => Ok(Self::Fallback),
            "native" => Ok(Self::Native),
            _ => Err(ConfigError::UnknownProfile(s.to_string())),
        }
    }
}

/// How a symbol is provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Returns -1 with errno `ENOSYS`; arguments are never inspected.
    AlwaysFail,
    /// Does nothing.
    NoOp,
    /// Returns the "no more entries" null pointer.
    Empty,
    /// Forwards to a semantically close primitive.
    Delegate,
    /// Invokes the kernel by numeric syscall identifier.
    RawSyscall,
    /// Not defined by the shim; the platform symbol is used.
    Native,
}

impl Strategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlwaysFail => "always_fail",
            Self::NoOp => "no_op",
            Self::Empty => "empty",
            Self::Delegate => "delegate",
            Self::RawSyscall => "raw_syscall",
            Self::Native => "native",
        }
    }

    /// Whether the shim emits a symbol for this strategy.
    #[must_use]
    pub const fn is_defined(self) -> bool {
        !matches!(self, Self::Native)
    }

    #[must_use]
    pub const fn error_policy(self) -> ErrorPolicy {
        match self {
            Self::AlwaysFail => ErrorPolicy::ExplicitFailure,
            Self::NoOp | Self::Empty => ErrorPolicy::SilentDegradation,
            Self::Delegate | Self::RawSyscall | Self::Native => ErrorPolicy::PassThrough,
        }
    }
}

/// Error-reporting contract a strategy honors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorPolicy {
    /// Failure return plus `ENOSYS`, never partial success.
    ExplicitFailure,
    /// Empty result, errno untouched.
    SilentDegradation,
    /// Whatever the delegate or kernel reports.
    PassThrough,
}

impl ErrorPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExplicitFailure => "explicit_failure",
            Self::SilentDegradation => "silent_degradation",
            Self::PassThrough => "pass_through",
        }
    }
}
