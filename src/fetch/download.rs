// src/fetch/download.rs

//! Downloading source archives

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::process::ProcessRunner;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};
use url::Url;

/// How a URL is downloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMethod {
    /// `http`/`https` through the built-in client (follows redirects)
    Http,
    /// `file://` copied from the local filesystem
    LocalFile,
    /// Anything else (`ftp`, ...) through `curl`
    Curl,
}

impl DownloadMethod {
    pub fn for_url(url: &str) -> Self {
        match Url::parse(url).as_ref().map(Url::scheme) {
            Ok("http") | Ok("https") => Self::Http,
            Ok("file") => Self::LocalFile,
            _ => Self::Curl,
        }
    }
}

/// Read size between cancellation checks while streaming a response
const CHUNK_SIZE: usize = 64 * 1024;

/// Download `url` to exactly `dest`
///
/// Partial files are removed when the download fails or is cancelled.
pub fn download_file(url: &str, dest: &Path, runner: &ProcessRunner<'_>) -> Result<()> {
    runner.cancel_token().check()?;
    let method = DownloadMethod::for_url(url);
    info!("Downloading {} -> {}", url, dest.display());
    debug!("Download method: {:?}", method);

    let result = match method {
        DownloadMethod::Http => download_http(url, dest, runner.cancel_token()),
        DownloadMethod::LocalFile => copy_local(url, dest),
        DownloadMethod::Curl => download_curl(url, dest, runner),
    };

    if result.is_err() && dest.exists() {
        let _ = fs::remove_file(dest);
    }
    result
}

fn download_error(url: &str, reason: impl ToString) -> Error {
    Error::DownloadError {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

fn download_http(url: &str, dest: &Path, cancel: &CancelToken) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("getlibs/", env!("CARGO_PKG_VERSION")))
        .timeout(None)
        .build()
        .map_err(|e| download_error(url, e))?;

    cancel.check()?;
    let mut response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| download_error(url, e))?;

    let mut file = File::create(dest).map_err(|e| download_error(url, e))?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut bytes: u64 = 0;
    loop {
        let n = response.read(&mut buf).map_err(|e| download_error(url, e))?;
        cancel.check()?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .map_err(|e| download_error(url, e))?;
        bytes += n as u64;
    }

    debug!("Downloaded {} bytes from {}", bytes, url);
    Ok(())
}

fn copy_local(url: &str, dest: &Path) -> Result<()> {
    let source = Url::parse(url)
        .ok()
        .and_then(|u| u.to_file_path().ok())
        .ok_or_else(|| download_error(url, "not a local file URL"))?;

    fs::copy(&source, dest).map_err(|e| download_error(url, e))?;
    Ok(())
}

fn download_curl(url: &str, dest: &Path, runner: &ProcessRunner<'_>) -> Result<()> {
    let mut cmd = Command::new("curl");
    cmd.args(["-fsSL", "-o"]).arg(dest).arg(url);

    let status = runner.run("curl", cmd).map_err(|e| match e {
        Error::WorkerInterrupted => e,
        other => download_error(url, other),
    })?;

    if !status.success() {
        return Err(download_error(
            url,
            format!("curl exited with {:?}", status.code()),
        ));
    }
    Ok(())
}
