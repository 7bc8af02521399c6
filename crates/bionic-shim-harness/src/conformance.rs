//! Conformance checks for the stub and fallback implementations.
//!
//! Each check calls one implementation through its `extern "C"` signature and
//! compares the return value and `errno` against the contract for its
//! strategy. Checks run against the Rust-visible functions in
//! `bionic_shim_abi::{stub, fallback}`, so both profiles can be verified from
//! one build regardless of which one is exported.

use std::ffi::{c_char, c_int};
use std::ptr;
use std::time::Instant;

use bionic_shim_abi::errno_abi::{errno, set_errno};
use bionic_shim_abi::{fallback, stub};
use bionic_shim_core::{Profile, ShimSymbol};
use serde::Serialize;

use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome, StreamKind};

type ClockWait =
    unsafe extern "C" fn(*mut libc::sem_t, libc::clockid_t, *const libc::timespec) -> c_int;

const CLOCKS: [libc::clockid_t; 2] = [libc::CLOCK_REALTIME, libc::CLOCK_MONOTONIC];

/// Descriptor window used by the live `close_range` check.
const FD_WINDOW: (c_int, c_int) = (700, 710);

/// Result of one conformance check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub id: String,
    pub profile: String,
    pub symbol: String,
    pub outcome: Outcome,
    pub expected: String,
    pub actual: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub latency_ns: u64,
}

impl CheckResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome != Outcome::Fail
    }
}

struct Observation {
    outcome: Outcome,
    expected: String,
    actual: String,
    errno: Option<i32>,
    note: Option<String>,
}

impl Observation {
    fn compare(expected: (i64, c_int), actual: (i64, c_int)) -> Self {
        Self {
            outcome: if expected == actual {
                Outcome::Pass
            } else {
                Outcome::Fail
            },
            expected: render(expected),
            actual: render(actual),
            errno: (actual.1 != 0).then_some(actual.1),
            note: None,
        }
    }

    fn skip(expected: &str, actual: (i64, c_int), note: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Skip,
            expected: expected.to_string(),
            actual: render(actual),
            errno: (actual.1 != 0).then_some(actual.1),
            note: Some(note.into()),
        }
    }

    fn fail(expected: &str, actual: String, note: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Fail,
            expected: expected.to_string(),
            actual,
            errno: None,
            note: Some(note.into()),
        }
    }
}

fn render((rc, e): (i64, c_int)) -> String {
    if e == 0 {
        format!("{rc}")
    } else {
        format!("{rc}/errno={e}")
    }
}

/// Call `f` with errno cleared; report its return value and errno.
fn observe(f: impl FnOnce() -> i64) -> (i64, c_int) {
    set_errno(0);
    let rc = f();
    (rc, if rc < 0 { errno() } else { 0 })
}

struct Check {
    id: &'static str,
    symbol: ShimSymbol,
    run: fn() -> Observation,
}

const ENOSYS_FAILURE: (i64, c_int) = (-1, libc::ENOSYS);

const STUB_CHECKS: &[Check] = &[
    Check {
        id: "stub.close_range.scenario",
        symbol: ShimSymbol::CloseRange,
        run: || Observation::compare(ENOSYS_FAILURE, observe(|| stub::close_range(3, 10, 0).into())),
    },
    Check {
        id: "stub.close_range.arguments_ignored",
        symbol: ShimSymbol::CloseRange,
        run: stub_close_range_any_arguments,
    },
    Check {
        id: "stub.copy_file_range.enosys",
        symbol: ShimSymbol::CopyFileRange,
        run: || {
            Observation::compare(
                ENOSYS_FAILURE,
                observe(|| {
                    stub::copy_file_range(-1, ptr::null_mut(), -1, ptr::null_mut(), 4096, 0) as i64
                }),
            )
        },
    },
    Check {
        id: "stub.preadv2.enosys",
        symbol: ShimSymbol::Preadv2,
        run: || {
            Observation::compare(
                ENOSYS_FAILURE,
                observe(|| stub::preadv2(0, ptr::null(), 1, 0, 0) as i64),
            )
        },
    },
    Check {
        id: "stub.pwritev2.enosys",
        symbol: ShimSymbol::Pwritev2,
        run: || {
            Observation::compare(
                ENOSYS_FAILURE,
                observe(|| stub::pwritev2(1, ptr::null(), 1, -1, 0) as i64),
            )
        },
    },
    Check {
        id: "stub.getloadavg.enosys",
        symbol: ShimSymbol::Getloadavg,
        run: || {
            let mut avg = [0.0f64; 3];
            Observation::compare(
                ENOSYS_FAILURE,
                observe(|| stub::getloadavg(avg.as_mut_ptr(), 3).into()),
            )
        },
    },
    Check {
        id: "stub.fexecve.enosys",
        symbol: ShimSymbol::Fexecve,
        run: || {
            let argv: [*const c_char; 1] = [ptr::null()];
            Observation::compare(
                ENOSYS_FAILURE,
                observe(|| stub::fexecve(0, argv.as_ptr(), argv.as_ptr()).into()),
            )
        },
    },
    Check {
        id: "stub.setpwent.endpwent.no_effect",
        symbol: ShimSymbol::Setpwent,
        run: stub_pwd_rewind_no_effect,
    },
    Check {
        id: "stub.getpwent.always_empty",
        symbol: ShimSymbol::Getpwent,
        run: stub_getpwent_always_empty,
    },
    Check {
        id: "stub.sem_clockwait.matches_sem_timedwait",
        symbol: ShimSymbol::SemClockwait,
        run: || sem_clockwait_parity(stub::sem_clockwait),
    },
];

const FALLBACK_CHECKS: &[Check] = &[
    Check {
        id: "fallback.sem_clockwait.matches_sem_timedwait",
        symbol: ShimSymbol::SemClockwait,
        run: || sem_clockwait_parity(fallback::sem_clockwait),
    },
    Check {
        id: "fallback.close_range.inverted_range",
        symbol: ShimSymbol::CloseRange,
        run: fallback_close_range_inverted,
    },
    Check {
        id: "fallback.close_range.closes_open_descriptors",
        symbol: ShimSymbol::CloseRange,
        run: fallback_close_range_live,
    },
];

fn checks_for(profile: Profile) -> &'static [Check] {
    match profile {
        Profile::Stub => STUB_CHECKS,
        Profile::Fallback => FALLBACK_CHECKS,
        Profile::Native => &[],
    }
}

/// Run every check for `profiles`, logging one entry per check.
pub fn run(profiles: &[Profile], log: &mut LogEmitter) -> std::io::Result<Vec<CheckResult>> {
    let mut results = Vec::new();
    for &profile in profiles {
        for check in checks_for(profile) {
            let start = Instant::now();
            let obs = (check.run)();
            let latency_ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);

            let level = match obs.outcome {
                Outcome::Pass => LogLevel::Info,
                Outcome::Skip => LogLevel::Warn,
                Outcome::Fail => LogLevel::Error,
            };
            let mut entry = LogEntry::new(String::new(), level, check.id)
                .with_stream(StreamKind::Conformance)
                .with_profile(profile.as_str())
                .with_symbol(
                    check.symbol.name(),
                    profile.strategy(check.symbol).as_str(),
                )
                .with_outcome(obs.outcome)
                .with_latency_ns(latency_ns)
                .with_details(serde_json::json!({
                    "expected": obs.expected,
                    "actual": obs.actual,
                    "note": obs.note,
                }));
            if let Some(e) = obs.errno {
                entry = entry.with_errno(e);
            }
            log.emit_entry(entry)?;

            results.push(CheckResult {
                id: check.id.to_string(),
                profile: profile.as_str().to_string(),
                symbol: check.symbol.name().to_string(),
                outcome: obs.outcome,
                expected: obs.expected,
                actual: obs.actual,
                errno: obs.errno,
                note: obs.note,
                latency_ns,
            });
        }
    }
    log.flush()?;
    Ok(results)
}

// ---------------------------------------------------------------------------
// Stub checks
// ---------------------------------------------------------------------------

fn stub_close_range_any_arguments() -> Observation {
    let shapes: [(u32, u32, c_int); 4] = [(0, 0, 0), (10, 3, 0), (0, u32::MAX, -1), (3, 3, 4)];
    for (first, last, flags) in shapes {
        let actual = observe(|| stub::close_range(first, last, flags).into());
        if actual != ENOSYS_FAILURE {
            let mut obs = Observation::compare(ENOSYS_FAILURE, actual);
            obs.note = Some(format!("close_range({first}, {last}, {flags})"));
            return obs;
        }
    }
    Observation::compare(ENOSYS_FAILURE, ENOSYS_FAILURE)
}

fn stub_pwd_rewind_no_effect() -> Observation {
    const SENTINEL: c_int = libc::E2BIG;
    set_errno(SENTINEL);
    for _ in 0..16 {
        stub::endpwent();
        stub::setpwent();
    }
    stub::setpwent();
    stub::endpwent();
    stub::endpwent();
    let after = errno();
    if after == SENTINEL {
        Observation::compare((0, 0), (0, 0))
    } else {
        Observation::fail(
            "errno untouched",
            format!("errno={after}"),
            "password database rewind must not report errors",
        )
    }
}

fn stub_getpwent_always_empty() -> Observation {
    stub::setpwent();
    let non_null = (0..100).filter(|_| !stub::getpwent().is_null()).count();
    stub::endpwent();
    if non_null == 0 {
        Observation::compare((0, 0), (0, 0))
    } else {
        Observation::fail(
            "100 x null",
            format!("{non_null} non-null entries"),
            "getpwent must always report end-of-database",
        )
    }
}

// ---------------------------------------------------------------------------
// Delegation checks
// ---------------------------------------------------------------------------

fn realtime_deadline(offset_secs: i64) -> libc::timespec {
    let mut now = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: now is a valid timespec.
    unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut now) };
    libc::timespec {
        tv_sec: now.tv_sec + offset_secs as libc::time_t,
        tv_nsec: now.tv_nsec,
    }
}

/// Compare `f` against `sem_timedwait` on an available semaphore and on an
/// empty one with an expired deadline, for every clock in [`CLOCKS`].
fn sem_clockwait_parity(f: ClockWait) -> Observation {
    // SAFETY: sem_t is plain data; sem_init initializes it below.
    let mut sem: Box<libc::sem_t> = Box::new(unsafe { std::mem::zeroed() });
    let sem_ptr: *mut libc::sem_t = &mut *sem;
    let waits = 1 + CLOCKS.len() as u32;
    // SAFETY: sem_ptr points to writable, process-private storage.
    if unsafe { libc::sem_init(sem_ptr, 0, waits) } != 0 {
        return Observation::skip("sem_init", (-1, errno()), "semaphores unavailable");
    }

    let mut result = None;
    for deadline in [realtime_deadline(5), realtime_deadline(-1)] {
        // SAFETY: semaphore initialized above; deadline is a valid timespec.
        let expected = observe(|| unsafe { libc::sem_timedwait(sem_ptr, &deadline) }.into());
        for clock in CLOCKS {
            // SAFETY: as above.
            let actual = observe(|| unsafe { f(sem_ptr, clock, &deadline) }.into());
            if actual != expected {
                let mut obs = Observation::compare(expected, actual);
                obs.note = Some(format!("clock id {clock}"));
                result = Some(obs);
                break;
            }
        }
        if result.is_some() {
            break;
        }
    }

    // SAFETY: no waiters remain.
    unsafe { libc::sem_destroy(sem_ptr) };
    result.unwrap_or_else(|| Observation::compare((0, 0), (0, 0)))
}

// ---------------------------------------------------------------------------
// Raw syscall checks
// ---------------------------------------------------------------------------

fn kernel_unavailable(actual: (i64, c_int)) -> bool {
    actual.0 == -1 && matches!(actual.1, libc::ENOSYS | libc::EPERM)
}

fn fallback_close_range_inverted() -> Observation {
    let (lo, hi) = FD_WINDOW;
    // SAFETY: an inverted range closes nothing.
    let actual = observe(|| unsafe { fallback::close_range(hi as u32, lo as u32, 0) }.into());
    if kernel_unavailable(actual) {
        return Observation::skip("-1/EINVAL", actual, "kernel lacks close_range");
    }
    Observation::compare((-1, libc::EINVAL), actual)
}

fn fd_open(fd: c_int) -> bool {
    // SAFETY: F_GETFD only queries the descriptor table.
    unsafe { libc::fcntl(fd, libc::F_GETFD) != -1 }
}

/// Duplicate `source` onto every target. On failure the descriptors already
/// placed are closed again and the failing target and errno are returned.
fn place_descriptors(source: c_int, targets: &[c_int]) -> Result<(), (c_int, c_int)> {
    for (i, &fd) in targets.iter().enumerate() {
        // SAFETY: source is open; the caller verified the targets are free.
        if unsafe { libc::dup2(source, fd) } != fd {
            let e = errno();
            for &placed in &targets[..i] {
                // SAFETY: closing descriptors placed above.
                unsafe { libc::close(placed) };
            }
            return Err((fd, e));
        }
    }
    Ok(())
}

fn fallback_close_range_live() -> Observation {
    let (lo, hi) = FD_WINDOW;
    if (lo..=hi).any(fd_open) {
        return Observation::skip("0", (0, 0), "descriptor window already in use");
    }
    // SAFETY: valid NUL-terminated path.
    let devnull = unsafe { libc::open(c"/dev/null".as_ptr(), libc::O_RDONLY) };
    if devnull < 0 {
        return Observation::skip("0", (-1, errno()), "cannot open /dev/null");
    }
    let targets = [lo + 3, lo + 5];
    let placed = place_descriptors(devnull, &targets);
    // SAFETY: devnull is ours.
    unsafe { libc::close(devnull) };
    if let Err((fd, e)) = placed {
        return Observation::skip("0", (-1, e), format!("cannot place descriptor {fd}"));
    }

    // SAFETY: the window only holds the descriptors placed above.
    let actual = observe(|| unsafe { fallback::close_range(lo as u32, hi as u32, 0) }.into());
    if kernel_unavailable(actual) {
        for fd in targets {
            // SAFETY: closing descriptors this check opened.
            unsafe { libc::close(fd) };
        }
        return Observation::skip("0", actual, "kernel lacks close_range");
    }
    let still_open: Vec<c_int> = targets.into_iter().filter(|&fd| fd_open(fd)).collect();
    if !still_open.is_empty() {
        return Observation::fail(
            "0, descriptors closed",
            format!("{}, still open: {still_open:?}", render(actual)),
            "close_range returned without closing the range",
        );
    }
    Observation::compare((0, 0), actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_suite_covers_every_stub_symbol() {
        for sym in Profile::Stub.defined_symbols() {
            if sym == ShimSymbol::Endpwent {
                // Exercised together with setpwent.
                continue;
            }
            assert!(
                STUB_CHECKS.iter().any(|c| c.symbol == sym),
                "no stub check for {sym}"
            );
        }
    }

    #[test]
    fn fallback_suite_covers_every_fallback_symbol() {
        for sym in Profile::Fallback.defined_symbols() {
            assert!(FALLBACK_CHECKS.iter().any(|c| c.symbol == sym));
        }
    }

    #[test]
    fn check_ids_are_prefixed_by_profile() {
        for c in STUB_CHECKS {
            assert!(c.id.starts_with("stub."));
        }
        for c in FALLBACK_CHECKS {
            assert!(c.id.starts_with("fallback."));
        }
    }

    #[test]
    fn native_has_no_checks() {
        let mut log = LogEmitter::to_sink("shim", "t");
        assert!(run(&[Profile::Native], &mut log).unwrap().is_empty());
    }

    #[test]
    fn failed_placement_is_reported_and_undone() {
        let free = FD_WINDOW.1 + 20;
        assert!(!fd_open(free));
        // SAFETY: valid NUL-terminated path.
        let devnull = unsafe { libc::open(c"/dev/null".as_ptr(), libc::O_RDONLY) };
        assert!(devnull >= 0);

        assert_eq!(
            place_descriptors(devnull, &[free, -1]),
            Err((-1, libc::EBADF))
        );
        assert!(!fd_open(free), "partially placed descriptor left open");

        assert_eq!(place_descriptors(devnull, &[free]), Ok(()));
        assert!(fd_open(free));
        // SAFETY: both descriptors were opened by this test.
        unsafe {
            libc::close(free);
            libc::close(devnull);
        }
    }

    #[test]
    fn render_formats_errno() {
        assert_eq!(render((0, 0)), "0");
        assert_eq!(render((-1, libc::ENOSYS)), format!("-1/errno={}", libc::ENOSYS));
    }
}
