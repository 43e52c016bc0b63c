//! Integration tests for archive creation: staging, flattening, optional
//! extras, and overwrite behavior.
//!
//! Archives are written through the library and read back with the same
//! crates an installer would use, so the checks cover the real wire
//! format rather than internal state.

use distpack::archive;
use distpack::config::ArchiveKind;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn zip_entry_names(path: &Path) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

fn zip_entry_contents(path: &Path, entry: &str) -> Vec<u8> {
    let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut file = zip.by_name(entry).unwrap();
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).unwrap();
    contents
}

fn tar_entry_names(path: &Path) -> Vec<String> {
    let decoder = flate2::read::GzDecoder::new(File::open(path).unwrap());
    let mut archive = tar::Archive::new(decoder);
    let mut names: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|entry| {
            entry
                .unwrap()
                .path()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

#[test]
fn zip_contains_binary_and_extras_flat() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let binary = write_file(src.path(), "demo", b"\x7fELF-ish");
    let extras = vec![
        write_file(src.path(), "LICENSE", b"MIT"),
        write_file(src.path(), "README.md", b"# demo"),
    ];
    let dest = out.path().join("demo-1.2.3-macos-arm64.zip");

    archive::package(&binary, "demo", &extras, &dest, ArchiveKind::Zip).unwrap();

    assert_eq!(zip_entry_names(&dest), vec!["LICENSE", "README.md", "demo"]);
    assert_eq!(zip_entry_contents(&dest, "demo"), b"\x7fELF-ish");
}

#[test]
fn tar_gz_contains_binary_and_extras_flat() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let binary = write_file(src.path(), "demo", b"\x7fELF-ish");
    let extras = vec![
        write_file(src.path(), "LICENSE", b"MIT"),
        write_file(src.path(), "README.md", b"# demo"),
    ];
    let dest = out.path().join("demo-1.2.3-linux-x86_64-musl.tar.gz");

    archive::package(&binary, "demo", &extras, &dest, ArchiveKind::TarGz).unwrap();

    assert_eq!(tar_entry_names(&dest), vec!["LICENSE", "README.md", "demo"]);
}

#[test]
fn absent_extras_are_silently_omitted() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let binary = write_file(src.path(), "demo", b"bin");
    // Paths that do not exist on disk.
    let extras = vec![src.path().join("LICENSE"), src.path().join("README.md")];
    let dest = out.path().join("demo-1.2.3-macos-x86_64.zip");

    archive::package(&binary, "demo", &extras, &dest, ArchiveKind::Zip).unwrap();

    assert_eq!(zip_entry_names(&dest), vec!["demo"]);
}

#[cfg(unix)]
#[test]
fn staged_binary_is_executable_in_zip() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let binary = write_file(src.path(), "demo", b"bin");
    let dest = out.path().join("demo.zip");

    archive::package(&binary, "demo", &[], &dest, ArchiveKind::Zip).unwrap();

    let mut zip = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
    let entry = zip.by_name("demo").unwrap();
    assert_eq!(entry.unix_mode().unwrap() & 0o777, 0o755);
}

#[test]
fn windows_binary_keeps_exe_name() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let binary = write_file(src.path(), "demo.exe", b"MZ-ish");
    let dest = out.path().join("demo-1.2.3-windows-x86_64.zip");

    archive::package(&binary, "demo.exe", &[], &dest, ArchiveKind::Zip).unwrap();

    assert_eq!(zip_entry_names(&dest), vec!["demo.exe"]);
}

#[test]
fn rerunning_overwrites_existing_archives() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let binary = write_file(src.path(), "demo", b"first build");
    let dest = out.path().join("demo-1.2.3-macos-arm64.zip");

    archive::package(&binary, "demo", &[], &dest, ArchiveKind::Zip).unwrap();
    let first = fs::metadata(&dest).unwrap().len();
    assert!(first > 0);

    // Rebuild with different contents; the archive must be replaced, not
    // appended to or rejected.
    fs::write(&binary, b"second build with more bytes").unwrap();
    archive::package(&binary, "demo", &[], &dest, ArchiveKind::Zip).unwrap();

    assert_eq!(zip_entry_contents(&dest, "demo"), b"second build with more bytes");
}

#[test]
fn tar_gz_round_trips_binary_contents() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let payload = b"static musl binary payload".to_vec();
    let binary = write_file(src.path(), "demo", &payload);
    let dest = out.path().join("demo-1.2.3-linux-arm64-musl.tar.gz");

    archive::package(&binary, "demo", &[], &dest, ArchiveKind::TarGz).unwrap();

    let decoder = flate2::read::GzDecoder::new(File::open(&dest).unwrap());
    let mut archive = tar::Archive::new(decoder);
    let mut found = None;
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        if entry.path().unwrap().to_string_lossy() == "demo" {
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).unwrap();
            found = Some(contents);
        }
    }
    assert_eq!(found.expect("demo entry"), payload);
}
