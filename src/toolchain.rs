//! Preflight validation of the external toolchain.
//!
//! Every build depends on a handful of external binaries. They are all
//! probed up front so the pipeline can abort with an actionable hint
//! before any build output exists, rather than failing halfway through.

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

use crate::cmd;

/// One external binary the pipeline depends on.
#[derive(Debug, Clone, Copy)]
pub struct RequiredTool {
    pub name: &'static str,
    /// Argument passed when probing (most tools accept `--version`).
    pub probe_arg: &'static str,
    /// Actionable install hint printed when the tool is missing.
    pub hint: &'static str,
    /// Optional tools downgrade absence to a warning.
    pub optional: bool,
}

/// Binaries probed before any build starts.
pub const REQUIRED_TOOLS: &[RequiredTool] = &[
    RequiredTool {
        name: "cargo",
        probe_arg: "--version",
        hint: "install Rust via https://rustup.rs",
        optional: false,
    },
    RequiredTool {
        name: "rustup",
        probe_arg: "--version",
        hint: "install Rust via https://rustup.rs",
        optional: false,
    },
    RequiredTool {
        name: "cargo-xwin",
        probe_arg: "--version",
        hint: "cargo install cargo-xwin",
        optional: false,
    },
    RequiredTool {
        name: "cargo-zigbuild",
        probe_arg: "--version",
        hint: "cargo install cargo-zigbuild (requires zig on PATH)",
        optional: false,
    },
    // lipo ships with the Xcode command line tools and has no --version;
    // the probe only checks that it spawns.
    RequiredTool {
        name: "lipo",
        probe_arg: "-info",
        hint: "xcode-select --install",
        optional: false,
    },
    // Stripping is best-effort; absence only warns.
    RequiredTool {
        name: "strip",
        probe_arg: "--version",
        hint: "binaries will be packaged unstripped",
        optional: true,
    },
];

/// A required tool is missing from PATH.
///
/// Typed so `main` can downcast and exit with the dedicated code before
/// any build step has run.
#[derive(Debug)]
pub struct MissingTool {
    pub tool: String,
    pub hint: String,
}

impl fmt::Display for MissingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "required tool '{}' not found on PATH — {}",
            self.tool, self.hint
        )
    }
}

impl std::error::Error for MissingTool {}

/// Probe every tool in `tools`, failing on the first missing required one.
///
/// Optional tools produce a warning string instead of an error. Returns
/// the accumulated warnings on success.
pub fn validate(tools: &[RequiredTool]) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    for tool in tools {
        if cmd::on_path(tool.name, tool.probe_arg) {
            continue;
        }
        if tool.optional {
            warnings.push(format!("'{}' not found on PATH; {}", tool.name, tool.hint));
            continue;
        }
        return Err(MissingTool {
            tool: tool.name.to_string(),
            hint: tool.hint.to_string(),
        }
        .into());
    }

    Ok(warnings)
}

/// Make sure rustc support for `triple` is installed, adding it when the
/// installed list omits it. Returns true if an install happened.
pub fn ensure_rust_target(project_root: &Path, triple: &str) -> Result<bool> {
    let installed = cmd::run_output(
        "rustup",
        &["target", "list", "--installed"],
        project_root,
    )
    .context("failed to list installed rustc targets")?;

    if installed_targets(&installed).any(|t| t == triple) {
        return Ok(false);
    }

    cmd::run_status("rustup", &["target", "add", triple], project_root)
        .with_context(|| format!("failed to add rustc target '{triple}'"))?;
    Ok(true)
}

fn installed_targets(list: &str) -> impl Iterator<Item = &str> {
    list.lines().map(str::trim).filter(|l| !l.is_empty())
}
