//! Subprocess helpers.
//!
//! Every pipeline step shells out through this module via
//! `std::process::Command`. Build-style commands stream their output
//! through to the terminal; query-style commands capture stdout.

use anyhow::{Context, Result};
use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// A subprocess that ran but exited unsuccessfully.
///
/// Carried inside `anyhow::Error` so `main` can downcast and propagate
/// the child's exit code as the pipeline's own exit code.
#[derive(Debug)]
pub struct CommandFailed {
    pub program: String,
    pub code: Option<i32>,
}

impl fmt::Display for CommandFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} failed (exit {})", self.program, code),
            None => write!(f, "{} terminated by signal", self.program),
        }
    }
}

impl std::error::Error for CommandFailed {}

// ---------------------------------------------------------------------------
// Runners
// ---------------------------------------------------------------------------

/// Run a command and return its stdout as a trimmed `String`.
/// Returns an error if the command exits with a non-zero status.
pub fn run_output(program: &str, args: &[&str], cwd: &Path) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .with_context(|| format!("failed to execute {program}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let failed = CommandFailed {
            program: program.to_string(),
            code: output.status.code(),
        };
        return Err(anyhow::Error::new(failed)
            .context(format!("{} {}: {}", program, args.join(" "), stderr.trim())));
    }

    let stdout = String::from_utf8(output.stdout)
        .with_context(|| format!("{program} output was not valid UTF-8"))?;
    Ok(stdout.trim().to_string())
}

/// Run a command with inherited stdio, so its output streams through.
/// Returns a `CommandFailed` error on a non-zero exit.
pub fn run_status(program: &str, args: &[&str], cwd: &Path) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .status()
        .with_context(|| format!("failed to execute {program}"))?;

    if !status.success() {
        return Err(CommandFailed {
            program: program.to_string(),
            code: status.code(),
        }
        .into());
    }

    Ok(())
}

/// Check whether a binary can be spawned from PATH.
///
/// The probe passes as long as the binary exists and is executable: a
/// non-zero exit still counts as present, since some tools (`lipo`) have
/// no version flag and fail on any probe argument.
pub fn on_path(program: &str, probe_arg: &str) -> bool {
    match Command::new(program)
        .arg(probe_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => true,
        Err(e) => e.kind() != io::ErrorKind::NotFound,
    }
}
