//! Per-call overhead of the shim entry points.
//!
//! Stubs should cost little more than an errno store; the fallbacks are
//! dominated by the kernel round trip.

use std::hint::black_box;
use std::ptr;

use bionic_shim_abi::{fallback, stub};
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_stubs(c: &mut Criterion) {
    let mut group = c.benchmark_group("stub");
    group.bench_function("close_range", |b| {
        b.iter(|| stub::close_range(black_box(3), black_box(10), black_box(0)))
    });
    group.bench_function("preadv2", |b| {
        b.iter(|| stub::preadv2(black_box(0), ptr::null(), black_box(1), 0, 0))
    });
    group.bench_function("getpwent", |b| b.iter(|| black_box(stub::getpwent())));
    group.finish();
}

fn bench_fallbacks(c: &mut Criterion) {
    let mut group = c.benchmark_group("fallback");
    // An inverted range is rejected by the kernel before any descriptor is touched.
    group.bench_function("close_range_einval", |b| {
        // SAFETY: an inverted range closes nothing.
        b.iter(|| unsafe { fallback::close_range(black_box(1001), black_box(1000), 0) })
    });

    // SAFETY: sem_t is plain data; sem_init initializes it below.
    let mut sem: Box<libc::sem_t> = Box::new(unsafe { std::mem::zeroed() });
    let sem_ptr: *mut libc::sem_t = &mut *sem;
    // SAFETY: sem_ptr points to writable, process-private storage.
    assert_eq!(unsafe { libc::sem_init(sem_ptr, 0, 0) }, 0);
    let mut deadline = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: deadline is a valid timespec.
    unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut deadline) };
    deadline.tv_sec -= 1;

    group.bench_function("sem_clockwait_post_wait", |b| {
        b.iter(|| {
            // SAFETY: semaphore initialized above and alive for the benchmark.
            unsafe {
                libc::sem_post(sem_ptr);
                fallback::sem_clockwait(sem_ptr, libc::CLOCK_MONOTONIC, &deadline)
            }
        })
    });
    group.finish();

    // SAFETY: no waiters remain.
    unsafe { libc::sem_destroy(sem_ptr) };
}

criterion_group!(benches, bench_stubs, bench_fallbacks);
criterion_main!(benches);
