use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

/// Files created during a run. Everything tracked is deleted when the guard
/// drops unless the caller asked to keep it.
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
    keep: bool,
}

impl TempFiles {
    pub fn new(keep: bool) -> Self {
        Self {
            paths: Vec::new(),
            keep,
        }
    }

    /// Track `path` before anything is written to it so a partial file is still removed.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            debug!("cleanup: tracking {}", path.display());
            self.paths.push(path);
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        if self.keep {
            info!("cleanup: keeping {} temporary file(s)", self.paths.len());
            return;
        }
        cleanup_temp_files(&self.paths);
    }
}

/// Remove every path that still exists, reporting each removal.
pub fn cleanup_temp_files(paths: &[PathBuf]) {
    println!("🧹 Cleaning up temporary files...");
    for path in paths {
        if !path.exists() {
            continue;
        }
        match fs::remove_file(path) {
            Ok(()) => println!("   Removed {}", display_name(path)),
            Err(err) => warn!("cleanup: failed to remove {}: {err}", path.display()),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
