// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use getlibs::BuildConfig;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Write `<dir>/<top>.tar.gz` whose entries all live under `top/`.
///
/// Returns a `file://` URL for the tarball, so builds never hit the network.
pub fn make_tarball(dir: &Path, top: &str, files: &[(&str, &str)]) -> String {
    let path = dir.join(format!("{}.tar.gz", top));
    let file = File::create(&path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}/{}", top, name), data.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();

    file_url(&path)
}

pub fn file_url(path: &Path) -> String {
    url::Url::from_file_path(path).unwrap().to_string()
}

/// Build configuration with scratch space inside `temp`
pub fn test_config(temp: &TempDir) -> BuildConfig {
    let mut config = BuildConfig::default().with_scratch_dir(temp.path().join("scratch"));
    config.poll_interval = Duration::from_millis(20);
    config
}

/// Directory tarballs are written to, separate from the install prefix
pub fn archive_dir(temp: &TempDir) -> PathBuf {
    let dir = temp.path().join("archives");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
