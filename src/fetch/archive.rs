// src/fetch/archive.rs

//! Archive name resolution and extraction

use crate::error::{Error, Result};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use xz2::read::XzDecoder;

/// Recognized archive extensions, in match priority order.
///
/// The first extension found anywhere in a URL wins, not the longest one.
/// Existing recipe URLs rely on this order.
pub const ARCHIVE_EXTENSIONS: [&str; 9] = [
    ".tgz", ".tbz2", ".tar.bz2", ".tar.gz", ".tar.xz", ".xz", ".rar", ".zip", ".7z",
];

/// Find the archive file name inside a URL
///
/// Returns the text from just after the last `/` preceding the matched
/// extension through the end of that extension.
///
/// ```
/// use getlibs::fetch::resolve_archive;
///
/// assert_eq!(
///     resolve_archive("https://gmplib.org/download/gmp/gmp-6.1.2.tar.bz2").unwrap(),
///     "gmp-6.1.2.tar.bz2"
/// );
/// assert!(resolve_archive("git://anongit.freedesktop.org/git/cppunit/").is_err());
/// ```
pub fn resolve_archive(url: &str) -> Result<String> {
    for ext in ARCHIVE_EXTENSIONS {
        if let Some(start) = url.rfind(ext) {
            let end = start + ext.len();
            let left = url[..end].rfind('/').map_or(0, |i| i + 1);
            return Ok(url[left..end].to_string());
        }
    }

    Err(Error::UnsupportedArchive(url.to_string()))
}

/// Archive container detected from a file's leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzip-compressed tarball
    TarGz,
    /// Bzip2-compressed tarball
    TarBz2,
    /// XZ-compressed tarball
    TarXz,
    /// Uncompressed tarball
    Tar,
    Zip,
    /// Anything else (rar, 7z, ...); needs the external helper
    Other,
}

impl ArchiveFormat {
    /// Detect the format from magic bytes
    ///
    /// Magic bytes:
    /// - Gzip: `1f 8b`
    /// - Bzip2: `BZh`
    /// - XZ: `fd 37 7a 58 5a 00`
    /// - Zip: `PK 03 04` (or `PK 05 06` for an empty archive)
    /// - Tar: `ustar` at offset 257
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x1f, 0x8b]) {
            Self::TarGz
        } else if data.starts_with(b"BZh") {
            Self::TarBz2
        } else if data.starts_with(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]) {
            Self::TarXz
        } else if data.starts_with(b"PK\x03\x04") || data.starts_with(b"PK\x05\x06") {
            Self::Zip
        } else if data.len() >= 262 && &data[257..262] == b"ustar" {
            Self::Tar
        } else {
            Self::Other
        }
    }

    /// Detect the format of a file on disk
    pub fn detect(path: &Path) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| {
            Error::ExtractError(format!("Cannot open {}: {}", path.display(), e))
        })?;
        let mut header = Vec::with_capacity(512);
        file.by_ref()
            .take(512)
            .read_to_end(&mut header)
            .map_err(|e| Error::ExtractError(format!("Cannot read {}: {}", path.display(), e)))?;
        Ok(Self::from_magic_bytes(&header))
    }

    /// Whether a built-in decoder handles this format
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Extract an archive into `dest` with the built-in decoders
///
/// Returns `ExtractError` for formats without a built-in decoder and for
/// streams that are not valid archives (e.g. a bare `.xz` file).
pub fn extract_builtin(archive: &Path, dest: &Path) -> Result<ArchiveFormat> {
    let format = ArchiveFormat::detect(archive)?;
    debug!("Extracting {} ({:?})", archive.display(), format);

    let open = || {
        File::open(archive)
            .map_err(|e| Error::ExtractError(format!("Cannot open {}: {}", archive.display(), e)))
    };
    let unpack_err = |e: std::io::Error| {
        Error::ExtractError(format!("Failed to unpack {}: {}", archive.display(), e))
    };

    match format {
        ArchiveFormat::TarGz => tar::Archive::new(GzDecoder::new(open()?))
            .unpack(dest)
            .map_err(unpack_err)?,
        ArchiveFormat::TarBz2 => tar::Archive::new(BzDecoder::new(open()?))
            .unpack(dest)
            .map_err(unpack_err)?,
        ArchiveFormat::TarXz => tar::Archive::new(XzDecoder::new(open()?))
            .unpack(dest)
            .map_err(unpack_err)?,
        ArchiveFormat::Tar => tar::Archive::new(open()?)
            .unpack(dest)
            .map_err(unpack_err)?,
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(open()?).map_err(|e| {
                Error::ExtractError(format!("Invalid zip {}: {}", archive.display(), e))
            })?;
            zip.extract(dest).map_err(|e| {
                Error::ExtractError(format!("Failed to unpack {}: {}", archive.display(), e))
            })?
        }
        ArchiveFormat::Other => {
            return Err(Error::ExtractError(format!(
                "No built-in decoder for {}",
                archive.display()
            )));
        }
    }

    Ok(format)
}
