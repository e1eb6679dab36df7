// src/infra/paths.rs — Path layout for config, ledger and install marker
//
// All paths respect the MIRRORS_HOME environment variable for isolation.
// When MIRRORS_HOME is set, config lives in that directory and data under
// MIRRORS_HOME/data. When unset, config uses ~/.mirrors/ and data uses the
// platform data dir (XDG_DATA_HOME/mirrors on Linux).
//
// The install marker sits in the config dir, apart from the ledger files in
// the data dir, so clearing app data does not look like a fresh install.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Returns the MIRRORS_HOME override, if set.
fn mirrors_home() -> Option<PathBuf> {
    std::env::var_os("MIRRORS_HOME").map(PathBuf::from)
}

/// Home directory, or the working directory when no home can be determined.
pub fn dirs_home() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $MIRRORS_HOME/ or ~/.mirrors/
pub fn config_dir() -> PathBuf {
    if let Some(home) = mirrors_home() {
        return home;
    }
    dirs_home().join(".mirrors")
}

/// Data directory: $MIRRORS_HOME/data/ or the platform data dir
pub fn data_dir() -> PathBuf {
    if let Some(home) = mirrors_home() {
        return home.join("data");
    }
    ProjectDirs::from("", "", "mirrors")
        .map(|d| d.data_local_dir().to_path_buf())
        .unwrap_or_else(|| config_dir().join("data"))
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// User-edited prompt template
pub fn prompt_path() -> PathBuf {
    config_dir().join("prompt.md")
}

/// Persisted snap balance
pub fn balance_path() -> PathBuf {
    data_dir().join("snaps.json")
}

/// Append-only snap transaction log
pub fn transaction_log_path() -> PathBuf {
    data_dir().join("snap_transactions.json")
}

/// First-launch marker
pub fn install_marker_path() -> PathBuf {
    config_dir().join("install-id")
}

/// Ensure all required directories exist
pub async fn ensure_dirs() -> anyhow::Result<()> {
    for dir in [config_dir(), data_dir()] {
        tokio::fs::create_dir_all(&dir).await?;
    }
    Ok(())
}
