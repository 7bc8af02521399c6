use std::env;
use std::fs;
use std::path::Path;

use bionic_shim_core::Profile;
use bionic_shim_core::syscall_table::{self, NumberSource, SyscallOp};

fn main() {
    let op = SyscallOp::CloseRange;
    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-env-changed={}", op.override_env());
    println!("cargo::rustc-check-cfg=cfg(shim_profile, values(\"stub\", \"fallback\", \"native\"))");

    let profile = Profile::from_features(
        env::var_os("CARGO_FEATURE_STUB").is_some(),
        env::var_os("CARGO_FEATURE_FALLBACK").is_some(),
    )
    .unwrap_or_else(|err| fail(&err));
    println!("cargo::rustc-cfg=shim_profile=\"{profile}\"");

    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    let pointer_width = env::var("CARGO_CFG_TARGET_POINTER_WIDTH")
        .ok()
        .and_then(|w| w.parse().ok())
        .unwrap_or(64);
    let override_value = env::var(op.override_env()).ok();
    let resolution = syscall_table::resolve_for_profile(
        profile,
        &arch,
        pointer_width,
        op,
        override_value.as_deref(),
    )
    .unwrap_or_else(|err| fail(&err));
    if resolution.source == NumberSource::Unavailable {
        println!(
            "cargo::warning=no {} syscall number for `{arch}`; set {} to enable the raw fallback",
            op.name(),
            op.override_env()
        );
    }

    let nr_expr = match resolution.nr {
        Some(nr) => format!("Some({nr})"),
        None => "None".to_string(),
    };
    let generated = format!(
        "/// Profile resolved from the enabled cargo features.\n\
         pub const PROFILE: Profile = Profile::{profile:?};\n\n\
         /// `close_range` syscall number for `{arch}`, if known.\n\
         pub const SYS_CLOSE_RANGE: Option<libc::c_long> = {nr_expr};\n\n\
         /// Where [`SYS_CLOSE_RANGE`] came from.\n\
         pub const SYS_CLOSE_RANGE_SOURCE: NumberSource = NumberSource::{:?};\n",
        resolution.source
    );

    let out_dir = env::var("OUT_DIR").unwrap_or_else(|_| fail(&"OUT_DIR is not set"));
    let dest = Path::new(&out_dir).join("shim_config.rs");
    if let Err(err) = fs::write(&dest, generated) {
        fail(&format!("writing {}: {err}", dest.display()));
    }
}

fn fail(err: &dyn std::fmt::Display) -> ! {
    panic!("bionic-shim-abi configuration error: {err}");
}
