//! Access to the host C library's thread-local `errno`.
//!
//! The shim sits on top of an existing libc, so errors are reported through
//! that libc's error indicator: `__errno_location()` on glibc/musl,
//! `__errno()` on Bionic.

use std::ffi::c_int;

#[cfg(target_os = "android")]
#[inline]
fn errno_location() -> *mut c_int {
    // SAFETY: __errno has no preconditions and returns this thread's errno slot.
    unsafe { libc::__errno() }
}

#[cfg(not(target_os = "android"))]
#[inline]
fn errno_location() -> *mut c_int {
    // SAFETY: __errno_location has no preconditions and returns this thread's errno slot.
    unsafe { libc::__errno_location() }
}

/// Set the calling thread's `errno`.
#[inline]
pub fn set_errno(val: c_int) {
    // SAFETY: the pointer is valid for the lifetime of the calling thread.
    unsafe { *errno_location() = val };
}

/// Read the calling thread's `errno`.
#[inline]
#[must_use]
pub fn errno() -> c_int {
    // SAFETY: the pointer is valid for the lifetime of the calling thread.
    unsafe { *errno_location() }
}
