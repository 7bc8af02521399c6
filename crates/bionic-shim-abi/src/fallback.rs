//! Functional-fallback profile.
//!
//! Two symbols get working implementations instead of stubs:
//! - `sem_clockwait` forwards to `sem_timedwait`. Only one underlying wait is
//!   available, so every clock id is treated the same.
//! - `close_range` invokes the kernel directly by syscall number, for
//!   platforms whose kernel has the syscall but whose libc lacks the wrapper.
//!   The number comes from the build-time table (see
//!   `bionic_shim_core::syscall_table`).
//!
//! Errors are exactly those of the delegate or the kernel; nothing is
//! translated or retried. These symbols are exported unmangled when the
//! `fallback` feature is active.

use std::ffi::{c_int, c_long, c_uint};

use crate::config::SYS_CLOSE_RANGE;
use crate::errno_abi::set_errno;

/// `sem_clockwait`: `sem_timedwait(sem, abstime)`; `clockid` is ignored.
///
/// # Safety
///
/// Same as `sem_timedwait`: `sem` must point to an initialized semaphore and
/// `abstime` to a valid `timespec`.
#[cfg_attr(
    all(not(debug_assertions), shim_profile = "fallback"),
    unsafe(no_mangle)
)]
pub unsafe extern "C" fn sem_clockwait(
    sem: *mut libc::sem_t,
    clockid: libc::clockid_t,
    abstime: *const libc::timespec,
) -> c_int {
    let _ = clockid;
    // SAFETY: caller upholds sem_timedwait's contract.
    unsafe { libc::sem_timedwait(sem, abstime) }
}

/// `close_range` via `syscall(SYS_close_range, first, last, flags)`.
///
/// Returns 0 on success, or -1 with `errno` set by the kernel (`EINVAL` for
/// `first > last` or unknown flags, `ENOSYS` on kernels older than 5.9). If
/// this build has no syscall number for the target, fails with `ENOSYS`
/// without entering the kernel; `build.rs` rejects that configuration when
/// this profile is selected.
///
/// # Safety
///
/// Every descriptor in `first..=last` is closed (or altered per `flags`).
/// The caller must own them: no other code, Rust `OwnedFd`s included, may
/// still rely on those descriptors.
#[cfg_attr(
    all(not(debug_assertions), shim_profile = "fallback"),
    unsafe(no_mangle)
)]
pub unsafe extern "C" fn close_range(first: c_uint, last: c_uint, flags: c_int) -> c_int {
    // SAFETY: forwarded caller contract.
    unsafe { close_range_with(SYS_CLOSE_RANGE, first, last, flags) }
}

/// `close_range` through syscall number `nr`; `None` fails with `ENOSYS`.
///
/// # Safety
///
/// Same as [`close_range`].
unsafe fn close_range_with(
    nr: Option<c_long>,
    first: c_uint,
    last: c_uint,
    flags: c_int,
) -> c_int {
    let Some(nr) = nr else {
        set_errno(libc::ENOSYS);
        return -1;
    };
    // SAFETY: close_range takes no pointers; descriptor ownership is the
    // caller's contract. The kernel reads flags as an unsigned int.
    let ret = unsafe { libc::syscall(nr, first, last, flags as c_uint) };
    ret as c_int
}
