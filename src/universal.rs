//! Universal macOS binary creation via `lipo`.

use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::cmd;

/// Merge single-architecture macOS binaries into one universal binary at
/// `output`, overwriting any previous merge result.
///
/// Every input must exist: a missing input means an upstream build did
/// not complete, and that is fatal here rather than silently producing a
/// thin binary.
pub fn merge(project_root: &Path, inputs: &[&Path], output: &Path) -> Result<()> {
    for input in inputs {
        if !input.is_file() {
            bail!(
                "universal merge input missing (build did not complete?): {}",
                input.display()
            );
        }
    }

    let mut args = vec!["-create", "-output", path_str(output)?];
    for input in inputs {
        args.push(path_str(input)?);
    }

    cmd::run_status("lipo", &args, project_root)
        .context("lipo failed to create universal binary")
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))
}
