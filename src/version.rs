use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://downloads.firestormviewer.org";
const INSTALLER_PATH: &str = "/preview/windows/Phoenix-Firestorm-Betax64_AVX2-{version}_Setup.exe";

/// A viewer release as typed by the maintainer, e.g. `7.2.0.78879`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    dotted: String,
}

impl Version {
    pub fn new(dotted: impl Into<String>) -> Self {
        Self {
            dotted: dotted.into(),
        }
    }

    pub fn dotted(&self) -> &str {
        &self.dotted
    }

    /// The form used in the vendor's installer file names (`7-2-0-78879`).
    #[must_use]
    pub fn hyphenated(&self) -> String {
        self.dotted.replace('.', "-")
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted)
    }
}

/// Where beta installers are published.
#[derive(Debug, Clone)]
pub struct InstallerSource {
    base_url: String,
}

impl InstallerSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn url_for(&self, version: &Version) -> String {
        format!(
            "{}{}",
            self.base_url,
            INSTALLER_PATH.replace("{version}", &version.hyphenated())
        )
    }
}

impl Default for InstallerSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
