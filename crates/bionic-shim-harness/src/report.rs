//! Build and conformance reports.

use std::path::Path;

use bionic_shim_abi::config::exported_symbols;
use bionic_shim_abi::{PROFILE, SYS_CLOSE_RANGE, SYS_CLOSE_RANGE_SOURCE};
use bionic_shim_core::{Profile, ShimSymbol};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::conformance::CheckResult;
use crate::structured_log::{Outcome, now_utc};

/// Resolution of one symbol in a build.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    pub name: &'static str,
    pub family: &'static str,
    pub prototype: &'static str,
    pub strategy: &'static str,
    pub error_policy: &'static str,
    /// Whether the shim defines the symbol (otherwise the platform's is used).
    pub defined: bool,
}

/// What this build of the shim provides.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub profile: &'static str,
    pub target_arch: &'static str,
    pub target_os: &'static str,
    pub sys_close_range: Option<i64>,
    /// `table`, `override` or `unavailable`.
    pub sys_close_range_source: &'static str,
    /// Names a release build of this profile exports unmangled.
    pub exported_symbols: Vec<&'static str>,
    pub symbols: Vec<SymbolReport>,
}

impl BuildReport {
    /// Report for the profile compiled into `bionic-shim-abi`.
    #[must_use]
    pub fn current() -> Self {
        Self {
            exported_symbols: exported_symbols().map(ShimSymbol::name).collect(),
            ..Self::for_profile(PROFILE)
        }
    }

    #[must_use]
    pub fn for_profile(profile: Profile) -> Self {
        let symbols = ShimSymbol::ALL
            .into_iter()
            .map(|sym| {
                let strategy = profile.strategy(sym);
                SymbolReport {
                    name: sym.name(),
                    family: sym.family().as_str(),
                    prototype: sym.prototype(),
                    strategy: strategy.as_str(),
                    error_policy: strategy.error_policy().as_str(),
                    defined: strategy.is_defined(),
                }
            })
            .collect();
        Self {
            profile: profile.as_str(),
            target_arch: std::env::consts::ARCH,
            target_os: std::env::consts::OS,
            sys_close_range: SYS_CLOSE_RANGE.map(i64::from),
            sys_close_range_source: SYS_CLOSE_RANGE_SOURCE.as_str(),
            exported_symbols: profile.defined_symbols().map(ShimSymbol::name).collect(),
            symbols,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    fn tally(results: &[CheckResult]) -> Self {
        let mut s = Self {
            total: results.len(),
            ..Self::default()
        };
        for r in results {
            match r.outcome {
                Outcome::Pass => s.passed += 1,
                Outcome::Fail => s.failed += 1,
                Outcome::Skip => s.skipped += 1,
            }
        }
        s
    }
}

/// Outcome of a verification run.
#[derive(Debug, Clone, Serialize)]
pub struct ConformanceReport {
    pub report_version: u32,
    pub generated_utc: String,
    pub build: BuildReport,
    pub verified_profiles: Vec<&'static str>,
    pub summary: Summary,
    pub results: Vec<CheckResult>,
}

impl ConformanceReport {
    #[must_use]
    pub fn new(profiles: &[Profile], results: Vec<CheckResult>) -> Self {
        Self {
            report_version: 1,
            generated_utc: now_utc(),
            build: BuildReport::current(),
            verified_profiles: profiles.iter().map(|p| p.as_str()).collect(),
            summary: Summary::tally(&results),
            results,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.summary.failed == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the JSON report to `path` and its digest to `<path>.sha256`.
    /// Returns the hex digest.
    pub fn write(&self, path: &Path) -> std::io::Result<String> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        let digest = sha256_hex(json.as_bytes());
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &json)?;
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(".sha256");
        std::fs::write(&sidecar, format!("{digest}\n"))?;
        Ok(digest)
    }
}

/// Lowercase hex SHA-256 of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
