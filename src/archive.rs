//! Archive creation: staging plus flat zip / tar.gz writing.
//!
//! Mirrors the distribution convention consumed by release installers: a
//! flat archive holding the binary and, when present, LICENSE and
//! README.md, with no directory nesting.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::config::ArchiveKind;

/// Stage `binary` (as `binary_name`) and any present `extras` into a
/// fresh temporary directory, then write `dest` in the requested format.
///
/// Absent extras are skipped silently. An existing archive at `dest` is
/// overwritten. The staging directory is removed when this returns.
pub fn package(
    binary: &Path,
    binary_name: &str,
    extras: &[PathBuf],
    dest: &Path,
    kind: ArchiveKind,
) -> Result<()> {
    let staging = TempDir::new().context("failed to create staging directory")?;
    let staged = stage(binary, binary_name, extras, staging.path())?;

    match kind {
        ArchiveKind::Zip => write_zip(&staged, dest),
        ArchiveKind::TarGz => write_tar_gz(&staged, dest),
    }
    .with_context(|| format!("failed to write archive {}", dest.display()))
}

/// Copy the binary and any present extras into `staging_dir`.
/// Returns the staged paths, binary first.
fn stage(
    binary: &Path,
    binary_name: &str,
    extras: &[PathBuf],
    staging_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let staged_binary = staging_dir.join(binary_name);
    fs::copy(binary, &staged_binary)
        .with_context(|| format!("failed to stage binary {}", binary.display()))?;
    make_executable(&staged_binary)?;

    let mut staged = vec![staged_binary];
    for extra in extras {
        if !extra.is_file() {
            continue;
        }
        let Some(file_name) = extra.file_name() else {
            continue;
        };
        let staged_extra = staging_dir.join(file_name);
        fs::copy(extra, &staged_extra)
            .with_context(|| format!("failed to stage {}", extra.display()))?;
        staged.push(staged_extra);
    }
    Ok(staged)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn write_zip(staged: &[PathBuf], dest: &Path) -> Result<()> {
    let file = File::create(dest)?;
    let mut writer = zip::ZipWriter::new(file);

    for path in staged {
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(unix_mode(path));
        writer.start_file(entry_name(path)?, options)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, &mut writer)?;
    }

    writer.finish()?;
    Ok(())
}

fn write_tar_gz(staged: &[PathBuf], dest: &Path) -> Result<()> {
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for path in staged {
        builder.append_path_with_name(path, entry_name(path)?)?;
    }

    builder.into_inner()?.finish()?;
    Ok(())
}

/// Flat entry name for a staged file.
fn entry_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .context("staged file has no UTF-8 name")
}

#[cfg(unix)]
fn unix_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn unix_mode(_path: &Path) -> u32 {
    0o644
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_names_are_flat() {
        assert_eq!(
            entry_name(Path::new("/tmp/staging-abc/demo")).unwrap(),
            "demo"
        );
        assert_eq!(
            entry_name(Path::new("/tmp/staging-abc/README.md")).unwrap(),
            "README.md"
        );
    }
}
