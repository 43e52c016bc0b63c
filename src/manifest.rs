//! Package metadata from the project manifest.
//!
//! Two read paths, tried in order:
//!
//! 1. Structured: `cargo metadata --no-deps` parsed as JSON. Preferred
//!    whenever `cargo` is invocable and the manifest is valid.
//! 2. Fallback: a naive line scan of `Cargo.toml` where the first
//!    `name = "…"` / `version = "…"` assignment wins, wherever it
//!    appears in the file.
//!
//! Neither path is allowed to fail the pipeline: missing fields come back
//! as empty strings and the orchestrator decides how loudly to complain.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::cmd;

/// Name and version read from the project manifest. Immutable after read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageMeta {
    pub name: String,
    pub version: String,
}

impl PackageMeta {
    /// True when the name is non-empty and the version parses as semver.
    /// A false result downgrades to a warning, never an abort.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && semver::Version::parse(&self.version).is_ok()
    }
}

#[derive(Debug, Deserialize)]
struct MetadataDoc {
    packages: Vec<MetadataPackage>,
}

#[derive(Debug, Deserialize)]
struct MetadataPackage {
    name: String,
    version: String,
}

/// Read package metadata, preferring the structured path.
pub fn read(project_root: &Path, manifest_path: &Path) -> PackageMeta {
    if let Some(meta) = read_structured(project_root) {
        return meta;
    }
    read_fallback(manifest_path)
}

/// Structured path: parse the JSON emitted by `cargo metadata`.
///
/// Returns `None` when cargo is missing, the manifest is unreadable, or
/// the output does not parse — the caller falls back to the line scan.
fn read_structured(project_root: &Path) -> Option<PackageMeta> {
    let stdout = cmd::run_output(
        "cargo",
        &["metadata", "--no-deps", "--format-version", "1"],
        project_root,
    )
    .ok()?;

    let doc: MetadataDoc = serde_json::from_str(&stdout).ok()?;
    let package = doc.packages.into_iter().next()?;
    Some(PackageMeta {
        name: package.name,
        version: package.version,
    })
}

/// Fallback path: first-match line extraction from the manifest text.
fn read_fallback(manifest_path: &Path) -> PackageMeta {
    let text = fs::read_to_string(manifest_path).unwrap_or_default();
    PackageMeta {
        name: extract_first(&text, "name"),
        version: extract_first(&text, "version"),
    }
}

/// Extract the value of the first `key = "value"` line in `text`.
/// Returns an empty string when no line matches.
fn extract_first(text: &str, key: &str) -> String {
    for line in text.lines() {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(key) else {
            continue;
        };
        let rest = rest.trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        if let Some(value) = rest.trim().strip_prefix('"').and_then(|r| r.split('"').next()) {
            return value.to_string();
        }
    }
    String::new()
}
