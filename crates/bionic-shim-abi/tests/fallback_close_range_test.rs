//! Integration tests for the raw-syscall `close_range` fallback.
//!
//! The tests work in a high descriptor window that they verify is free
//! before touching it, so the test runner's own descriptors are never
//! closed. Kernels without `close_range` (older than 5.9) or sandboxes that
//! filter it report `ENOSYS`/`EPERM`; those runs are skipped.

use std::ffi::c_int;

use bionic_shim_abi::errno_abi::{errno, set_errno};
use bionic_shim_abi::{SYS_CLOSE_RANGE, fallback};
use parking_lot::{Mutex, const_mutex};

static FD_LOCK: Mutex<()> = const_mutex(());

const WINDOW_START: c_int = 600;
const WINDOW_END: c_int = 610;

fn is_open(fd: c_int) -> bool {
    // SAFETY: F_GETFD only queries the descriptor table.
    unsafe { libc::fcntl(fd, libc::F_GETFD) != -1 }
}

fn fd_flags(fd: c_int) -> c_int {
    // SAFETY: F_GETFD only queries the descriptor table.
    unsafe { libc::fcntl(fd, libc::F_GETFD) }
}

/// Place `/dev/null` duplicates at `targets`, all inside the test window.
/// Returns `None` when the window is already in use.
fn open_at(targets: &[c_int]) -> Option<()> {
    if (WINDOW_START..=WINDOW_END).any(is_open) {
        return None;
    }
    // SAFETY: valid NUL-terminated path.
    let devnull = unsafe { libc::open(c"/dev/null".as_ptr(), libc::O_RDONLY) };
    assert!(devnull >= 0, "open /dev/null failed: errno {}", errno());
    for &fd in targets {
        // SAFETY: devnull is open; fd was verified free.
        assert_eq!(unsafe { libc::dup2(devnull, fd) }, fd);
    }
    // SAFETY: devnull is ours.
    unsafe { libc::close(devnull) };
    Some(())
}

fn close_window() {
    for fd in WINDOW_START..=WINDOW_END {
        // SAFETY: the window only holds descriptors opened by these tests.
        unsafe { libc::close(fd) };
    }
}

fn kernel_lacks_close_range(rc: c_int) -> bool {
    rc == -1 && matches!(errno(), libc::ENOSYS | libc::EPERM)
}

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
#[test]
fn syscall_number_is_configured() {
    assert!(SYS_CLOSE_RANGE.is_some());
}

#[test]
fn closes_open_descriptors_in_range() {
    let _guard = FD_LOCK.lock();
    if open_at(&[WINDOW_START + 3, WINDOW_START + 5]).is_none() {
        eprintln!("descriptor window in use; skipping");
        return;
    }
    assert!(is_open(WINDOW_START + 3) && is_open(WINDOW_START + 5));

    set_errno(0);
    // SAFETY: the window only holds descriptors opened above.
    let rc = unsafe { fallback::close_range(WINDOW_START as u32, WINDOW_END as u32, 0) };
    if kernel_lacks_close_range(rc) {
        close_window();
        eprintln!("close_range unavailable in this kernel; skipping");
        return;
    }

    assert_eq!(rc, 0, "close_range failed: errno {}", errno());
    assert!(!is_open(WINDOW_START + 3));
    assert!(!is_open(WINDOW_START + 5));
}

#[test]
fn empty_range_succeeds_without_side_effects() {
    let _guard = FD_LOCK.lock();
    if open_at(&[]).is_none() {
        return;
    }
    set_errno(0);
    // SAFETY: nothing is open in the window.
    let rc = unsafe { fallback::close_range(WINDOW_START as u32, WINDOW_END as u32, 0) };
    if kernel_lacks_close_range(rc) {
        return;
    }
    assert_eq!(rc, 0);
    // A single-descriptor range that holds nothing is also fine.
    // SAFETY: as above.
    let rc = unsafe { fallback::close_range(WINDOW_END as u32, WINDOW_END as u32, 0) };
    assert_eq!(rc, 0);
}

#[test]
fn inverted_range_returns_einval() {
    let _guard = FD_LOCK.lock();
    set_errno(0);
    // SAFETY: an inverted range closes nothing.
    let rc = unsafe { fallback::close_range(WINDOW_END as u32, WINDOW_START as u32, 0) };
    if kernel_lacks_close_range(rc) {
        return;
    }
    assert_eq!(rc, -1);
    assert_eq!(errno(), libc::EINVAL);
}

#[test]
fn cloexec_flag_marks_instead_of_closing() {
    let _guard = FD_LOCK.lock();
    if open_at(&[WINDOW_START + 1]).is_none() {
        return;
    }
    let fd = WINDOW_START + 1;
    assert_eq!(fd_flags(fd) & libc::FD_CLOEXEC, 0);

    const CLOSE_RANGE_CLOEXEC: c_int = 1 << 2;
    set_errno(0);
    // SAFETY: the window only holds descriptors opened above.
    let rc = unsafe {
        fallback::close_range(WINDOW_START as u32, WINDOW_END as u32, CLOSE_RANGE_CLOEXEC)
    };
    // CLOSE_RANGE_CLOEXEC arrived in 5.11; 5.9/5.10 answer EINVAL.
    if kernel_lacks_close_range(rc) || (rc == -1 && errno() == libc::EINVAL) {
        close_window();
        return;
    }
    assert_eq!(rc, 0);
    assert!(is_open(fd), "CLOEXEC mode must keep the descriptor open");
    assert_ne!(fd_flags(fd) & libc::FD_CLOEXEC, 0);
    close_window();
}
