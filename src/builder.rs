//! Release builds per target, plus best-effort symbol stripping.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cmd;
use crate::config::{Backend, Config, Target};

/// Run the optimized build for `target` and return the built binary path.
///
/// Compiler output streams straight through to the terminal. A build
/// failure aborts the pipeline with the backend's own exit code.
pub fn build(config: &Config, package_name: &str, target: &Target) -> Result<PathBuf> {
    let (program, args) = build_invocation(target);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    cmd::run_status(program, &args, &config.project_root)
        .with_context(|| format!("release build failed for {}", target.triple))?;
    Ok(built_binary_path(config, package_name, target))
}

/// Program and argument vector for a target's build backend.
fn build_invocation(target: &Target) -> (&'static str, Vec<String>) {
    let mut args: Vec<String> = match target.backend {
        Backend::Cargo => vec!["build".into()],
        Backend::Xwin => vec!["xwin".into(), "build".into()],
        Backend::Zigbuild => vec!["zigbuild".into()],
    };
    args.push("--release".into());
    args.push("--target".into());
    args.push(target.triple.into());
    ("cargo", args)
}

/// Path of the binary produced by a release build for `target`.
pub fn built_binary_path(config: &Config, package_name: &str, target: &Target) -> PathBuf {
    config
        .project_root
        .join("target")
        .join(target.triple)
        .join("release")
        .join(binary_file_name(package_name, target.is_windows()))
}

/// Binary file name on disk: Windows carries an `.exe` suffix.
pub fn binary_file_name(package_name: &str, windows: bool) -> String {
    if windows {
        format!("{package_name}.exe")
    } else {
        package_name.to_string()
    }
}

/// Outcome of a stripping attempt.
///
/// Failures are explicitly a warning, never an error: `strip` behaves
/// unpredictably on cross-compiled binaries on some hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripOutcome {
    Stripped,
    Skipped { reason: String },
}

/// Strip debug symbols from `binary`, best-effort.
pub fn strip_binary(binary: &Path) -> StripOutcome {
    match Command::new("strip").arg(binary).output() {
        Ok(out) if out.status.success() => StripOutcome::Stripped,
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr);
            StripOutcome::Skipped {
                reason: format!(
                    "strip failed (exit {}): {}",
                    out.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            }
        }
        Err(e) => StripOutcome::Skipped {
            reason: format!("could not run strip: {e}"),
        },
    }
}
