//! Helper macros for stub generation.
//!
//! Provides `enosys_fn!`, which generates an `extern "C"` function that
//! ignores its arguments, sets `errno` to `ENOSYS` and returns -1.

/// Generate an always-failing `extern "C"` stub.
///
/// # Usage
///
/// ```ignore
/// enosys_fn! {
///     /// Doc comment for the function.
///     fn my_func(arg1: Type1, arg2: Type2) -> ReturnType;
/// }
/// ```
///
/// Attributes (including `cfg_attr` export switches) are forwarded. Arguments
/// are bound so the signature matches the C prototype, but never read.
macro_rules! enosys_fn {
    ($(
        $(#[$meta:meta])*
        fn $name:ident( $($arg:ident : $argty:ty),* $(,)? ) -> $ret:ty;
    )*) => {$(
        $(#[$meta])*
        pub extern "C" fn $name( $($arg : $argty),* ) -> $ret {
            let _ = ($($arg,)*);
            $crate::errno_abi::set_errno(libc::ENOSYS);
            -1
        }
    )*};
}

#[allow(unused_imports)]
pub(crate) use enosys_fn;
