//! Build configuration resolved by `build.rs`.
//!
//! The profile and syscall number are fixed when this crate is compiled;
//! nothing here is read from the environment at run time.

use bionic_shim_core::{NumberSource, Profile, ShimSymbol, Strategy};

include!(concat!(env!("OUT_DIR"), "/shim_config.rs"));

/// Strategy `sym` resolves to in this build.
#[must_use]
pub const fn active_strategy(sym: ShimSymbol) -> Strategy {
    PROFILE.strategy(sym)
}

/// Symbols this build exports, in catalogue order.
pub fn exported_symbols() -> impl Iterator<Item = ShimSymbol> {
    PROFILE.defined_symbols()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cfg_matches_generated_profile() {
        let cfg_profile = if cfg!(shim_profile = "stub") {
            Profile::Stub
        } else if cfg!(shim_profile = "fallback") {
            Profile::Fallback
        } else {
            Profile::Native
        };
        assert_eq!(cfg_profile, PROFILE);
    }

    #[test]
    fn raw_syscall_profile_always_has_a_number() {
        if active_strategy(ShimSymbol::CloseRange) == Strategy::RawSyscall {
            assert!(SYS_CLOSE_RANGE.is_some());
        }
    }

    #[test]
    fn number_is_missing_only_when_unavailable() {
        assert_eq!(
            SYS_CLOSE_RANGE.is_none(),
            SYS_CLOSE_RANGE_SOURCE == NumberSource::Unavailable
        );
    }

    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    #[test]
    fn common_targets_use_unified_number() {
        assert_ne!(SYS_CLOSE_RANGE_SOURCE, NumberSource::Unavailable);
        if SYS_CLOSE_RANGE_SOURCE == NumberSource::Table {
            assert_eq!(SYS_CLOSE_RANGE, Some(436));
        }
    }

    #[test]
    fn exported_symbols_follow_profile() {
        assert_eq!(
            exported_symbols().count(),
            PROFILE.defined_symbols().count()
        );
    }
}
