//! Pipeline configuration and the static target table.
//!
//! Everything the pipeline needs — manifest location, output directory,
//! optional packaging extras, and the target list — lives in `Config`, so
//! each step receives explicit data instead of reaching for globals. The
//! values themselves are fixed: this tool deliberately takes no flags.

use std::path::PathBuf;

/// Manifest file read for package metadata, relative to the project root.
pub const MANIFEST_FILE: &str = "Cargo.toml";

/// Output directory for finished archives, relative to the project root.
pub const OUTPUT_DIR: &str = "dist";

/// Optional files staged next to the binary when present.
pub const EXTRA_FILES: &[&str] = &["LICENSE", "README.md"];

/// Build backend used for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Native `cargo build`.
    Cargo,
    /// `cargo xwin build` — cross-compilation against the native MSVC ABI.
    Xwin,
    /// `cargo zigbuild` — cross-compilation with static musl linking.
    Zigbuild,
}

/// Archive container format, chosen per platform convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// File extension without a leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::TarGz => "tar.gz",
        }
    }
}

/// One release target: platform, architecture, optional libc variant, and
/// the rustc triple plus backend that produce its binary.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub os: &'static str,
    pub arch: &'static str,
    pub libc: Option<&'static str>,
    pub triple: &'static str,
    pub backend: Backend,
}

/// The five shipped targets. Order is build order.
pub const TARGETS: &[Target] = &[
    Target {
        os: "macos",
        arch: "arm64",
        libc: None,
        triple: "aarch64-apple-darwin",
        backend: Backend::Cargo,
    },
    Target {
        os: "macos",
        arch: "x86_64",
        libc: None,
        triple: "x86_64-apple-darwin",
        backend: Backend::Cargo,
    },
    Target {
        os: "linux",
        arch: "x86_64",
        libc: Some("musl"),
        triple: "x86_64-unknown-linux-musl",
        backend: Backend::Zigbuild,
    },
    Target {
        os: "linux",
        arch: "arm64",
        libc: Some("musl"),
        triple: "aarch64-unknown-linux-musl",
        backend: Backend::Zigbuild,
    },
    Target {
        os: "windows",
        arch: "x86_64",
        libc: None,
        triple: "x86_64-pc-windows-msvc",
        backend: Backend::Xwin,
    },
];

impl Target {
    /// Platform label used in archive names: `<os>-<arch>[-<libc>]`.
    pub fn label(&self) -> String {
        match self.libc {
            Some(libc) => format!("{}-{}-{}", self.os, self.arch, libc),
            None => format!("{}-{}", self.os, self.arch),
        }
    }

    /// Linux ships gzipped tarballs; macOS and Windows ship zips.
    pub fn archive_kind(&self) -> ArchiveKind {
        if self.os == "linux" {
            ArchiveKind::TarGz
        } else {
            ArchiveKind::Zip
        }
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    pub fn is_macos(&self) -> bool {
        self.os == "macos"
    }
}

/// Archive file name for a target: `<name>-<version>-<os>-<arch>[-libc].<ext>`.
///
/// Installers and download scripts key on these exact strings.
pub fn archive_file_name(name: &str, version: &str, target: &Target) -> String {
    format!(
        "{name}-{version}-{}.{}",
        target.label(),
        target.archive_kind().extension()
    )
}

/// Archive file name for the merged universal macOS binary.
pub fn universal_archive_name(name: &str, version: &str) -> String {
    format!(
        "{name}-{version}-macos-universal.{}",
        ArchiveKind::Zip.extension()
    )
}

/// Explicit configuration handed to every pipeline step.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    pub manifest_path: PathBuf,
    pub output_dir: PathBuf,
    pub extra_files: Vec<PathBuf>,
    pub targets: &'static [Target],
}

impl Config {
    /// Standard layout rooted at `project_root`.
    pub fn from_project_root(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            manifest_path: project_root.join(MANIFEST_FILE),
            output_dir: project_root.join(OUTPUT_DIR),
            extra_files: EXTRA_FILES.iter().map(|f| project_root.join(f)).collect(),
            targets: TARGETS,
            project_root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_paths_are_rooted_at_project_root() {
        let config = Config::from_project_root("/tmp/proj");
        assert_eq!(config.manifest_path, PathBuf::from("/tmp/proj/Cargo.toml"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/proj/dist"));
        assert_eq!(config.extra_files.len(), EXTRA_FILES.len());
        assert!(config.extra_files[0].starts_with("/tmp/proj"));
    }

    #[test]
    fn labels_include_libc_variant_only_when_present() {
        let musl = TARGETS
            .iter()
            .find(|t| t.triple == "x86_64-unknown-linux-musl")
            .unwrap();
        assert_eq!(musl.label(), "linux-x86_64-musl");

        let mac = TARGETS
            .iter()
            .find(|t| t.triple == "aarch64-apple-darwin")
            .unwrap();
        assert_eq!(mac.label(), "macos-arm64");
    }
}
