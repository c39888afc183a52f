use std::io::{Cursor, Read};
use std::path::{Component, Path};

use anyhow::{anyhow, Context, Result};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use serde_json::json;
use tar::Archive;
use tracing::debug;

use crate::InstallUserError;

/// Top-level archive directories whose files become wrapped executables.
pub(crate) const EXECUTABLE_DIRS: [&str; 2] = ["bin", "python-scripts"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArchiveFormat {
    TarBz2,
    TarGz,
    Tar,
    CondaZip,
}

pub(crate) fn detect_format(bytes: &[u8]) -> ArchiveFormat {
    if bytes.starts_with(b"BZh") {
        ArchiveFormat::TarBz2
    } else if bytes.starts_with(&[0x1f, 0x8b]) {
        ArchiveFormat::TarGz
    } else if bytes.starts_with(b"PK\x03\x04") {
        ArchiveFormat::CondaZip
    } else {
        ArchiveFormat::Tar
    }
}

/// Names of the programs a package archive ships, in archive order.
pub(crate) fn list_executables(bytes: &[u8]) -> Result<Vec<String>> {
    let format = detect_format(bytes);
    debug!(?format, size = bytes.len(), "scanning package archive");
    match format {
        ArchiveFormat::TarBz2 => scan_tar(BzDecoder::new(Cursor::new(bytes))),
        ArchiveFormat::TarGz => scan_tar(GzDecoder::new(Cursor::new(bytes))),
        ArchiveFormat::Tar => scan_tar(Cursor::new(bytes)),
        ArchiveFormat::CondaZip => Err(anyhow!(InstallUserError::new(
            "`.conda` package archives are not supported",
            json!({
                "reason": "unsupported_archive",
                "hint": "publish or select a .tar.bz2 build of the package",
            }),
        ))),
    }
}

fn scan_tar<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut archive = Archive::new(reader);
    let mut names: Vec<String> = Vec::new();
    for entry in archive.entries().context("reading package archive")? {
        let entry = entry.context("reading package archive entry")?;
        if entry.header().entry_type().is_dir() {
            continue;
        }
        let path = entry.path().context("decoding archive entry path")?;
        if let Some(name) = executable_name(&path) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    Ok(names)
}

fn executable_name(path: &Path) -> Option<String> {
    let mut components = path
        .components()
        .filter(|component| !matches!(component, Component::CurDir));
    let Some(Component::Normal(dir)) = components.next() else {
        return None;
    };
    if !EXECUTABLE_DIRS.iter().any(|candidate| dir == *candidate) {
        return None;
    }
    let Some(Component::Normal(name)) = components.next() else {
        return None;
    };
    if components.next().is_some() {
        return None;
    }
    name.to_str().map(ToString::to_string)
}
