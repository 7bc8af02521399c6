//! Stub-suppression profile.
//!
//! Symbols the target libc does not implement are defined so that portable
//! code links, and then behave in one of three ways:
//! - Facilities with no safe emulation (`close_range`, `copy_file_range`,
//!   `preadv2`, `pwritev2`, `getloadavg`, `fexecve`) always return -1 with
//!   `errno = ENOSYS`. Arguments are never inspected, so null or dangling
//!   pointers are fine.
//! - The password database is always empty: `setpwent`/`endpwent` do nothing,
//!   `getpwent` returns null. `errno` is not touched.
//! - `sem_clockwait` forwards to `sem_timedwait`, dropping the clock id.
//!
//! These symbols are exported unmangled when the `stub` feature is active.

use std::ffi::{c_char, c_double, c_int, c_uint};
use std::ptr;

// `off64_t` is i64 on every Linux ABI; the libc crate does not export it for musl.

enosys_fn! {
    /// `close_range`: always -1 / `ENOSYS`.
    #[cfg_attr(all(not(debug_assertions), shim_profile = "stub"), unsafe(no_mangle))]
    fn close_range(first: c_uint, last: c_uint, flags: c_int) -> c_int;

    /// `copy_file_range`: always -1 / `ENOSYS`.
    #[cfg_attr(all(not(debug_assertions), shim_profile = "stub"), unsafe(no_mangle))]
    fn copy_file_range(
        fd_in: c_int,
        off_in: *mut i64,
        fd_out: c_int,
        off_out: *mut i64,
        len: libc::size_t,
        flags: c_uint,
    ) -> libc::ssize_t;

    /// `preadv2`: always -1 / `ENOSYS`.
    #[cfg_attr(all(not(debug_assertions), shim_profile = "stub"), unsafe(no_mangle))]
    fn preadv2(
        fd: c_int,
        iov: *const libc::iovec,
        iovcnt: c_int,
        offset: libc::off_t,
        flags: c_int,
    ) -> libc::ssize_t;

    /// `pwritev2`: always -1 / `ENOSYS`.
    #[cfg_attr(all(not(debug_assertions), shim_profile = "stub"), unsafe(no_mangle))]
    fn pwritev2(
        fd: c_int,
        iov: *const libc::iovec,
        iovcnt: c_int,
        offset: libc::off_t,
        flags: c_int,
    ) -> libc::ssize_t;

    /// `getloadavg`: always -1 / `ENOSYS`; `loadavg` is left untouched.
    #[cfg_attr(all(not(debug_assertions), shim_profile = "stub"), unsafe(no_mangle))]
    fn getloadavg(loadavg: *mut c_double, nelem: c_int) -> c_int;

    /// `fexecve`: always -1 / `ENOSYS`; the calling process image is kept.
    #[cfg_attr(all(not(debug_assertions), shim_profile = "stub"), unsafe(no_mangle))]
    fn fexecve(fd: c_int, argv: *const *const c_char, envp: *const *const c_char) -> c_int;
}

/// `setpwent`: no-op.
#[cfg_attr(all(not(debug_assertions), shim_profile = "stub"), unsafe(no_mangle))]
pub extern "C" fn setpwent() {}

/// `endpwent`: no-op.
#[cfg_attr(all(not(debug_assertions), shim_profile = "stub"), unsafe(no_mangle))]
pub extern "C" fn endpwent() {}

/// `getpwent`: the database has no entries.
#[cfg_attr(all(not(debug_assertions), shim_profile = "stub"), unsafe(no_mangle))]
pub extern "C" fn getpwent() -> *mut libc::passwd {
    ptr::null_mut()
}

/// `sem_clockwait`: `sem_timedwait(sem, abstime)`; `clockid` is ignored.
///
/// # Safety
///
/// Same as `sem_timedwait`: `sem` must point to an initialized semaphore and
/// `abstime` to a valid `timespec`.
#[cfg_attr(all(not(debug_assertions), shim_profile = "stub"), unsafe(no_mangle))]
pub unsafe extern "C" fn sem_clockwait(
    sem: *mut libc::sem_t,
    clockid: libc::clockid_t,
    abstime: *const libc::timespec,
) -> c_int {
    let _ = clockid;
    // SAFETY: caller upholds sem_timedwait's contract.
    unsafe { libc::sem_timedwait(sem, abstime) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errno_abi::{errno, set_errno};

    #[test]
    fn close_range_fails_with_enosys() {
        set_errno(0);
        assert_eq!(close_range(3, 10, 0), -1);
        assert_eq!(errno(), libc::ENOSYS);
    }

    #[test]
    fn null_pointers_are_never_dereferenced() {
        set_errno(0);
        assert_eq!(
            copy_file_range(-1, ptr::null_mut(), -1, ptr::null_mut(), usize::MAX, !0),
            -1
        );
        assert_eq!(errno(), libc::ENOSYS);

        set_errno(0);
        assert_eq!(preadv2(-1, ptr::null(), -5, -1, -1), -1);
        assert_eq!(errno(), libc::ENOSYS);

        set_errno(0);
        assert_eq!(pwritev2(i32::MAX, ptr::null(), i32::MAX, i64::MIN as libc::off_t, 0), -1);
        assert_eq!(errno(), libc::ENOSYS);

        set_errno(0);
        assert_eq!(getloadavg(ptr::null_mut(), 3), -1);
        assert_eq!(errno(), libc::ENOSYS);

        set_errno(0);
        assert_eq!(fexecve(-1, ptr::null(), ptr::null()), -1);
        assert_eq!(errno(), libc::ENOSYS);
    }

    #[test]
    fn getloadavg_leaves_buffer_untouched() {
        let mut avg = [7.5f64; 3];
        assert_eq!(getloadavg(avg.as_mut_ptr(), 3), -1);
        assert_eq!(avg, [7.5; 3]);
    }

    #[test]
    fn password_database_is_empty_and_silent() {
        set_errno(libc::EINTR);
        endpwent();
        setpwent();
        setpwent();
        for _ in 0..100 {
            assert!(getpwent().is_null());
        }
        endpwent();
        assert_eq!(errno(), libc::EINTR, "pwd stubs must not touch errno");
    }
}
