use std::io;
use std::path::PathBuf;

use log::{debug, info};

use crate::checksum;
use crate::cleanup::TempFiles;
use crate::env;
use crate::manifest::{self, ManifestError};
use crate::networking::{FetchError, InstallerClient};
use crate::version::{InstallerSource, Version};

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub version: Version,
    pub manifest_path: PathBuf,
    pub temp_dir: PathBuf,
    pub keep_temp: bool,
    pub source: InstallerSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub version: Version,
    pub checksum: String,
    pub manifest_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("Error: Manifest not found at {}", .0.display())]
    ManifestMissing(PathBuf),
    #[error("Environment setup failed: {0}")]
    Setup(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Failed to hash {}: {source}", .path.display())]
    Checksum { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Download the installer for `options.version`, hash it and point the manifest at it.
///
/// Downloads are registered with `temp`; the caller drops it once the result
/// has been reported, which removes them unless `keep_temp` is set.
pub async fn run(
    options: &UpdateOptions,
    temp: &mut TempFiles,
) -> Result<UpdateOutcome, UpdateError> {
    if !options.manifest_path.exists() {
        return Err(UpdateError::ManifestMissing(options.manifest_path.clone()));
    }

    let client = InstallerClient::new(options.source.clone())
        .map_err(|e| UpdateError::Setup(format!("unable to build HTTP client: {e}")))?;
    env::ensure_dir(&options.temp_dir).map_err(|e| {
        UpdateError::Setup(format!(
            "unable to create temp dir {}: {e}",
            options.temp_dir.display()
        ))
    })?;

    temp.track(client.destination(&options.version, &options.temp_dir)?);
    debug!("update: tracking {:?}", temp.paths());

    let installer = client
        .download_installer(&options.version, &options.temp_dir)
        .await?;

    println!("🔐 Calculating SHA256...");
    let checksum = checksum::sha256_file(&installer).map_err(|source| UpdateError::Checksum {
        path: installer.clone(),
        source,
    })?;

    println!("📝 Updating manifest...");
    manifest::update_manifest(
        &options.manifest_path,
        &options.version,
        client.source(),
        &checksum,
    )?;
    info!("update: {} -> {}", options.version, checksum);

    Ok(UpdateOutcome {
        version: options.version.clone(),
        checksum,
        manifest_path: options.manifest_path.clone(),
    })
}
