use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const BUCKET_DIR: &str = "bucket";
const MANIFEST_FILE: &str = "firestorm-beta.json";
const TEMP_DIR: &str = "temp";

/// Returns the directory holding the running executable (the `helpers/` folder of the bucket).
pub fn tool_dir() -> io::Result<PathBuf> {
    let exe = env::current_exe()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("executable {} has no parent directory", exe.display()),
        )
    })
}

/// Manifest location relative to the tool: one level up, then `bucket/firestorm-beta.json`.
pub fn manifest_path(tool_dir: &Path) -> PathBuf {
    let root = tool_dir.parent().unwrap_or(tool_dir);
    root.join(BUCKET_DIR).join(MANIFEST_FILE)
}

/// Downloads live next to the tool so they never end up inside the bucket.
pub fn temp_dir(tool_dir: &Path) -> PathBuf {
    tool_dir.join(TEMP_DIR)
}

pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}
