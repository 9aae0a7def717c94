use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::version::{InstallerSource, Version};

const ARCHITECTURE_KEY: &str = "architecture";
const ARCH_64BIT_KEY: &str = "64bit";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse manifest {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("manifest {} is missing the `{key}` object", .path.display())]
    MissingKey { path: PathBuf, key: &'static str },
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write manifest {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Point the manifest at a new release: `version`, `architecture.64bit.url` and
/// `architecture.64bit.hash` are replaced, everything else is written back as read.
pub fn update_manifest(
    path: &Path,
    version: &Version,
    source: &InstallerSource,
    checksum: &str,
) -> Result<(), ManifestError> {
    let raw = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut manifest: Value = serde_json::from_str(&raw).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    apply_release(&mut manifest, version, &source.url_for(version), checksum).map_err(
        |key| ManifestError::MissingKey {
            path: path.to_path_buf(),
            key,
        },
    )?;

    let mut rendered = serde_json::to_string_pretty(&manifest)?;
    if raw.ends_with('\n') {
        rendered.push('\n');
    }
    write_atomic(path, rendered.as_bytes()).map_err(|source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("manifest: {} now points at {}", path.display(), version);
    Ok(())
}

/// Returns the name of the first object that is absent or not an object.
fn apply_release(
    manifest: &mut Value,
    version: &Version,
    url: &str,
    checksum: &str,
) -> Result<(), &'static str> {
    let root = manifest.as_object_mut().ok_or("root")?;
    root.insert("version".into(), Value::String(version.dotted().to_owned()));

    let arch64 = root
        .get_mut(ARCHITECTURE_KEY)
        .and_then(Value::as_object_mut)
        .ok_or(ARCHITECTURE_KEY)?
        .get_mut(ARCH_64BIT_KEY)
        .and_then(Value::as_object_mut)
        .ok_or("architecture.64bit")?;
    set_string(arch64, "url", url.to_owned());
    set_string(arch64, "hash", format!("sha256:{checksum}"));
    debug!("manifest: url={url} hash=sha256:{checksum}");
    Ok(())
}

fn set_string(object: &mut Map<String, Value>, key: &str, value: String) {
    object.insert(key.to_owned(), Value::String(value));
}

/// Replace the file behind `path` in one rename. Symlinks are followed so the
/// link survives, and the original permissions are carried over.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let target = fs::canonicalize(path)?;
    let dir = target
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents)?;
    staged.flush()?;
    staged
        .as_file()
        .set_permissions(fs::metadata(&target)?.permissions())?;
    staged.persist(&target).map_err(|err| err.error)?;
    Ok(())
}
