use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use reqwest::{Client, StatusCode, Url};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::version::{InstallerSource, Version};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Error: Version not found at {url}")]
    NotFound { url: String },
    #[error("HTTP error while downloading: {status} for url ({url})")]
    Status { url: String, status: StatusCode },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Network error: download incomplete: received {received} of {expected} bytes")]
    Incomplete { received: u64, expected: u64 },
    #[error("Error: cannot derive an installer file name from {url}")]
    FileName { url: String },
    #[error("failed to write {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

pub struct InstallerClient {
    client: Client,
    source: InstallerSource,
}

impl InstallerClient {
    pub fn new(source: InstallerSource) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT);
        if is_loopback(source.base_url()) {
            debug!("fetch: loopback mirror {}, bypassing proxies", source.base_url());
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Self { client, source })
    }

    pub fn source(&self) -> &InstallerSource {
        &self.source
    }

    /// Where the installer for `version` lands inside `dest_dir`.
    pub fn destination(&self, version: &Version, dest_dir: &Path) -> Result<PathBuf, FetchError> {
        let url = self.source.url_for(version);
        let name = installer_file_name(&url).ok_or_else(|| FetchError::FileName { url })?;
        Ok(dest_dir.join(name))
    }

    /// Stream the installer for `version` into `dest_dir` and return the written path.
    pub async fn download_installer(
        &self,
        version: &Version,
        dest_dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        let url = self.source.url_for(version);
        let dest = self.destination(version, dest_dir)?;
        println!("⬇️ Downloading {url} ...");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!("fetch: {url} returned 404");
            return Err(FetchError::NotFound { url });
        }
        if !status.is_success() {
            warn!("fetch: {url} returned {status}");
            return Err(FetchError::Status { url, status });
        }

        let io_err = |source| FetchError::Io {
            path: dest.clone(),
            source,
        };
        let mut file = File::create(&dest).await.map_err(io_err)?;

        let total = response.content_length();
        let bar = progress_bar(total);
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(io_err)?;
            downloaded += chunk.len() as u64;
            bar.set_position(downloaded);
        }
        file.flush().await.map_err(io_err)?;
        bar.finish_and_clear();

        debug!("fetch: wrote {downloaded} bytes to {}", dest.display());
        if let Some(total) = total
            && downloaded < total
        {
            return Err(FetchError::Incomplete {
                received: downloaded,
                expected: total,
            });
        }
        info!("fetch: saved {}", dest.display());
        Ok(dest)
    }
}

fn is_loopback(base_url: &str) -> bool {
    Url::parse(base_url)
        .ok()
        .and_then(|url| {
            url.host_str().map(|host| {
                host == "localhost"
                    || host
                        .trim_matches(|c| c == '[' || c == ']')
                        .parse::<IpAddr>()
                        .is_ok_and(|ip| ip.is_loopback())
            })
        })
        .unwrap_or(false)
}

/// Raw text after the last `/`, matching the name the installer is published under.
fn installer_file_name(url: &str) -> Option<String> {
    url.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    let Some(total) = total else {
        return ProgressBar::new_spinner();
    };
    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(
        "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    ) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}
