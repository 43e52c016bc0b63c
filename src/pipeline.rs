//! The release pipeline: a strict linear sequence with explicit result
//! propagation.
//!
//! The orchestrator decides per step whether a failure aborts the run
//! (missing tools, build and merge failures) or is recorded as a warning
//! and carried to the summary (stripping, incomplete metadata).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::archive;
use crate::builder::{self, StripOutcome};
use crate::config::{self, ArchiveKind, Config};
use crate::manifest;
use crate::output;
use crate::toolchain;
use crate::universal;

/// A produced archive.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub label: String,
    pub path: PathBuf,
}

/// Everything a full run produced.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub artifacts: Vec<Artifact>,
    pub warnings: Vec<String>,
}

/// Run the whole pipeline: metadata, toolchain preflight, the five target
/// builds, the universal merge, and the summary.
pub fn run(config: &Config) -> Result<PipelineReport> {
    let mut report = PipelineReport::default();

    // Package metadata. Empty fields are tolerated but not silent.
    let meta = manifest::read(&config.project_root, &config.manifest_path);
    if !meta.is_complete() {
        report.warnings.push(format!(
            "package metadata incomplete (name '{}', version '{}'); archive names will be malformed",
            meta.name, meta.version
        ));
    }
    output::action("Packaging", &format!("{} {}", meta.name, meta.version));

    // Toolchain preflight. Aborts before any build output exists.
    let tool_warnings = toolchain::validate(toolchain::REQUIRED_TOOLS)?;
    report.warnings.extend(tool_warnings);

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    // Build, strip, and archive each target in order. Any build failure
    // aborts the run; the backends' own output explains it.
    let mut macos_binaries = Vec::new();
    for target in config.targets {
        output::action("Building", target.triple);
        if toolchain::ensure_rust_target(&config.project_root, target.triple)? {
            output::detail(&format!("installed rustc target {}", target.triple));
        }

        let binary = builder::build(config, &meta.name, target)?;
        record_strip(&mut report, builder::strip_binary(&binary), target.triple);

        if target.is_macos() {
            macos_binaries.push(binary.clone());
        }

        let archive_name = config::archive_file_name(&meta.name, &meta.version, target);
        let dest = config.output_dir.join(&archive_name);
        archive::package(
            &binary,
            &builder::binary_file_name(&meta.name, target.is_windows()),
            &config.extra_files,
            &dest,
            target.archive_kind(),
        )?;
        output::success("Packaged", &archive_name);
        report.artifacts.push(Artifact {
            label: target.label(),
            path: dest,
        });
    }

    // Universal macOS binary from the two darwin builds.
    output::action("Merging", "universal macOS binary");
    let universal_binary = universal_binary_path(config, &meta.name);
    if let Some(parent) = universal_binary.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let inputs: Vec<&Path> = macos_binaries.iter().map(PathBuf::as_path).collect();
    universal::merge(&config.project_root, &inputs, &universal_binary)?;
    record_strip(
        &mut report,
        builder::strip_binary(&universal_binary),
        "universal binary",
    );

    let archive_name = config::universal_archive_name(&meta.name, &meta.version);
    let dest = config.output_dir.join(&archive_name);
    archive::package(
        &universal_binary,
        &meta.name,
        &config.extra_files,
        &dest,
        ArchiveKind::Zip,
    )?;
    output::success("Packaged", &archive_name);
    report.artifacts.push(Artifact {
        label: "macos-universal".to_string(),
        path: dest,
    });

    summarize(config, &report);
    Ok(report)
}

/// Fresh path for the merged binary, alongside the per-triple build trees.
fn universal_binary_path(config: &Config, package_name: &str) -> PathBuf {
    config
        .project_root
        .join("target")
        .join("universal-apple-darwin")
        .join("release")
        .join(package_name)
}

fn record_strip(report: &mut PipelineReport, outcome: StripOutcome, label: &str) {
    if let StripOutcome::Skipped { reason } = outcome {
        let warning = format!("did not strip {label}: {reason}");
        output::note(&warning);
        report.warnings.push(warning);
    }
}

/// List the output directory contents, then the accumulated warnings.
/// Purely informational.
fn summarize(config: &Config, report: &PipelineReport) {
    output::action("Artifacts", &config.output_dir.display().to_string());
    match fs::read_dir(&config.output_dir) {
        Ok(entries) => {
            let mut lines: Vec<String> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                    format!("{name} ({size} bytes)")
                })
                .collect();
            lines.sort();
            for line in &lines {
                output::detail(line);
            }
        }
        Err(e) => output::note(&format!(
            "could not list {}: {e}",
            config.output_dir.display()
        )),
    }

    for warning in &report.warnings {
        output::note(warning);
    }
    output::success("Done", &format!("{} archives", report.artifacts.len()));
}
