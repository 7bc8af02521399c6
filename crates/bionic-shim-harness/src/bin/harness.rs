//! CLI entrypoint for the bionic-shim conformance harness.

use std::path::PathBuf;

use bionic_shim_core::Profile;
use bionic_shim_harness::structured_log::{
    LogEmitter, LogEntry, LogLevel, StreamKind, validate_log_file,
};
use bionic_shim_harness::{BuildReport, ConformanceReport, HarnessError, conformance};
use clap::{Parser, Subcommand};

/// Conformance tooling for bionic-shim.
#[derive(Debug, Parser)]
#[command(name = "shim-harness")]
#[command(about = "Report and verify the libc compatibility shim")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Describe the compiled-in profile and per-symbol strategies as JSON.
    Report {
        /// Output JSON path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run conformance checks against the stub and/or fallback implementations.
    Verify {
        /// Profile to verify: `stub`, `fallback`, `all`, or `active` (the compiled-in one).
        #[arg(long, default_value = "all")]
        profile: String,
        /// Structured JSONL log path (if omitted, logs go to stdout).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Report JSON path; a `<path>.sha256` digest is written beside it.
        #[arg(long, default_value = "target/conformance/shim_report.json")]
        output: PathBuf,
        /// Run identifier used in trace ids.
        #[arg(long, default_value = "local")]
        run_id: String,
    },
    /// Validate a structured JSONL log file.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

const SUITE_ID: &str = "bionic-shim";

fn parse_profiles(raw: &str) -> Result<Vec<Profile>, HarnessError> {
    Ok(match raw.to_ascii_lowercase().as_str() {
        "all" => vec![Profile::Stub, Profile::Fallback],
        "active" => vec![bionic_shim_abi::PROFILE],
        other => vec![other.parse()?],
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Report { output } => {
            let json = serde_json::to_string_pretty(&BuildReport::current())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    eprintln!("Wrote build report to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Verify {
            profile,
            log,
            output,
            run_id,
        } => {
            let profiles = parse_profiles(&profile)?;
            let mut emitter = match &log {
                Some(path) => LogEmitter::to_file(path, SUITE_ID, &run_id)?,
                None => LogEmitter::to_stdout(SUITE_ID, &run_id),
            };
            emitter.emit_entry(
                LogEntry::new(String::new(), LogLevel::Info, "verify_start")
                    .with_stream(StreamKind::Conformance)
                    .with_profile(bionic_shim_abi::PROFILE.as_str())
                    .with_details(serde_json::json!({
                        "verified_profiles": profiles.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                    })),
            )?;

            let results = conformance::run(&profiles, &mut emitter)?;
            let report = ConformanceReport::new(&profiles, results);
            let digest = report.write(&output)?;

            emitter.emit_entry(
                LogEntry::new(String::new(), LogLevel::Info, "verify_complete")
                    .with_stream(StreamKind::Report)
                    .with_details(serde_json::json!({
                        "summary": &report.summary,
                        "report": output.display().to_string(),
                        "sha256": digest,
                    })),
            )?;
            emitter.flush()?;

            eprintln!(
                "{} checks: {} passed, {} failed, {} skipped. Report: {} (sha256 {digest})",
                report.summary.total,
                report.summary.passed,
                report.summary.failed,
                report.summary.skipped,
                output.display(),
            );
            if !report.all_passed() {
                return Err(HarnessError::ChecksFailed {
                    failed: report.summary.failed,
                    total: report.summary.total,
                }
                .into());
            }
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            if !errors.is_empty() {
                return Err(HarnessError::InvalidLog {
                    lines,
                    errors: errors.len(),
                }
                .into());
            }
            eprintln!("{lines} log lines valid");
        }
    }

    Ok(())
}
