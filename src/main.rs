use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::debug;

mod checksum;
mod cleanup;
mod env;
mod manifest;
mod networking;
mod updater;
mod version;

#[cfg(test)]
mod test_server;

use cleanup::TempFiles;
use updater::{UpdateOptions, UpdateOutcome};
use version::{InstallerSource, Version};

#[derive(Parser, Debug)]
#[command(
    name = "update-firestorm",
    author,
    version,
    about = "Update the Firestorm Beta Scoop manifest."
)]
struct Cli {
    /// New Firestorm version (e.g. 7.2.0.78879).
    #[arg(value_name = "VERSION", value_parser = non_empty)]
    release: String,

    /// Keep temporary downloaded files (don't clean up).
    #[arg(long)]
    keep_temp: bool,

    /// Manifest to update. Defaults to ../bucket/firestorm-beta.json next to the executable.
    #[arg(long, env = "FIRESTORM_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Directory for downloaded installers. Defaults to temp/ next to the executable.
    #[arg(long, env = "FIRESTORM_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Download host for beta installers.
    #[arg(long, env = "FIRESTORM_BASE_URL", default_value = version::DEFAULT_BASE_URL)]
    base_url: String,
}

impl Cli {
    fn into_options(self) -> Result<UpdateOptions, String> {
        let (manifest_path, temp_dir) = match (self.manifest, self.temp_dir) {
            (Some(manifest), Some(temp)) => (manifest, temp),
            (manifest, temp) => {
                let tool_dir = env::tool_dir()
                    .map_err(|e| format!("unable to locate the executable directory: {e}"))?;
                (
                    manifest.unwrap_or_else(|| env::manifest_path(&tool_dir)),
                    temp.unwrap_or_else(|| env::temp_dir(&tool_dir)),
                )
            }
        };
        Ok(UpdateOptions {
            version: Version::new(self.release),
            manifest_path,
            temp_dir,
            keep_temp: self.keep_temp,
            source: InstallerSource::new(self.base_url),
        })
    }
}

fn non_empty(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("version must not be empty".into())
    } else {
        Ok(value.to_owned())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let options = match cli.into_options() {
        Ok(options) => options,
        Err(err) => {
            println!("❌ Environment setup failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    debug!("options: {options:?}");

    let mut temp = TempFiles::new(options.keep_temp);
    let code = match updater::run(&options, &mut temp).await {
        Ok(outcome) => {
            print_next_steps(&outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("❌ {err}");
            ExitCode::FAILURE
        }
    };
    drop(temp);
    code
}

fn print_next_steps(outcome: &UpdateOutcome) {
    let manifest = outcome
        .manifest_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "firestorm-beta.json".into());
    println!(
        "✅ Done. Updated firestorm-beta to version {}.",
        outcome.version
    );
    println!("📋 SHA256: {}", outcome.checksum);
    println!("💡 Next steps:");
    println!("   git add bucket/{manifest}");
    println!(
        "   git commit -m \"Update firestorm-beta to {}\"",
        outcome.version
    );
    println!("   git push");
    println!("   scoop update firestorm-beta");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_and_keep_temp() {
        let cli = Cli::try_parse_from([
            "update-firestorm",
            "7.2.0.78879",
            "--keep-temp",
            "--manifest",
            "bucket/firestorm-beta.json",
            "--temp-dir",
            "helpers/temp",
        ])
        .unwrap();
        assert!(cli.keep_temp);

        let options = cli.into_options().unwrap();
        assert_eq!(options.version.dotted(), "7.2.0.78879");
        assert_eq!(options.manifest_path, PathBuf::from("bucket/firestorm-beta.json"));
        assert_eq!(options.temp_dir, PathBuf::from("helpers/temp"));
        assert!(options.keep_temp);
    }

    #[test]
    fn keep_temp_defaults_off() {
        let cli = Cli::try_parse_from(["update-firestorm", "7.2.0.1"]).unwrap();
        assert!(!cli.keep_temp);
    }

    #[test]
    fn version_is_required_and_non_empty() {
        assert!(Cli::try_parse_from(["update-firestorm"]).is_err());
        assert!(Cli::try_parse_from(["update-firestorm", "  "]).is_err());
    }

    #[test]
    fn default_paths_follow_executable() {
        let cli = Cli::try_parse_from(["update-firestorm", "7.2.0.1"]).unwrap();
        let tool_dir = env::tool_dir().unwrap();
        let options = cli.into_options().unwrap();
        if std::env::var_os("FIRESTORM_MANIFEST").is_none() {
            assert_eq!(options.manifest_path, env::manifest_path(&tool_dir));
        }
        if std::env::var_os("FIRESTORM_TEMP_DIR").is_none() {
            assert_eq!(options.temp_dir, env::temp_dir(&tool_dir));
        }
    }
}
