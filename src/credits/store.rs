// src/credits/store.rs — Durable balance value and install-identity flag
//
// The balance and the install flag are separate capabilities on purpose: the
// flag must outlive a wipe of the balance file, otherwise a reinstall would be
// indistinguishable from a first launch and re-seed the credits.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::infra::errors::MirrorsError;
use crate::infra::paths;

/// Persistence the ledger needs, injected so tests can run in memory.
pub trait LedgerStore: Send + Sync {
    fn read_install_flag(&self) -> Result<bool, MirrorsError>;
    fn write_install_flag(&self) -> Result<(), MirrorsError>;
    /// `None` when no balance has ever been written.
    fn read_balance(&self) -> Result<Option<u32>, MirrorsError>;
    fn write_balance(&self, balance: u32) -> Result<(), MirrorsError>;
}

/// On-disk shape of the balance file.
#[derive(Debug, Serialize, Deserialize)]
struct BalanceFile {
    #[serde(rename = "snapsCount")]
    snaps_count: u32,
}

/// Balance in the data dir, install marker in the config dir.
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    balance_path: PathBuf,
    marker_path: PathBuf,
}

impl FileLedgerStore {
    pub fn new(balance_path: impl Into<PathBuf>, marker_path: impl Into<PathBuf>) -> Self {
        Self {
            balance_path: balance_path.into(),
            marker_path: marker_path.into(),
        }
    }

    /// Store at the default locations under the mirrors home.
    pub fn open_default() -> Self {
        Self::new(paths::balance_path(), paths::install_marker_path())
    }

    pub fn balance_path(&self) -> &Path {
        &self.balance_path
    }

    pub fn marker_path(&self) -> &Path {
        &self.marker_path
    }
}

impl LedgerStore for FileLedgerStore {
    fn read_install_flag(&self) -> Result<bool, MirrorsError> {
        Ok(self.marker_path.exists())
    }

    fn write_install_flag(&self) -> Result<(), MirrorsError> {
        let id = uuid::Uuid::new_v4().to_string();
        atomic_write(&self.marker_path, id.as_bytes())
    }

    fn read_balance(&self) -> Result<Option<u32>, MirrorsError> {
        let content = match std::fs::read_to_string(&self.balance_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: BalanceFile = serde_json::from_str(&content).map_err(|e| {
            MirrorsError::Ledger(format!(
                "corrupt balance file {}: {e}",
                self.balance_path.display()
            ))
        })?;
        Ok(Some(file.snaps_count))
    }

    fn write_balance(&self, balance: u32) -> Result<(), MirrorsError> {
        let json = serde_json::to_vec(&BalanceFile {
            snaps_count: balance,
        })
        .map_err(|e| MirrorsError::Ledger(e.to_string()))?;
        atomic_write(&self.balance_path, &json)
    }
}

/// Write via temp file + rename so a crash never leaves a torn value.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), MirrorsError> {
    let dir = path
        .parent()
        .ok_or_else(|| MirrorsError::Ledger(format!("no parent dir for {}", path.display())))?;
    std::fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{file_name}.tmp"));

    let mut f = std::fs::File::create(&tmp)?;
    f.write_all(bytes)?;
    f.flush()?;
    f.sync_all()?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[derive(Debug, Default)]
struct MemoryState {
    install_flag: bool,
    balance: Option<u32>,
    fail_balance_writes: bool,
}

/// In-memory store. Clones share state, so a clone handed to a second ledger
/// behaves like the same device after a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the balance but keep the install flag (app data cleared).
    pub fn clear_balance(&self) {
        if let Ok(mut s) = self.state.lock() {
            s.balance = None;
        }
    }

    /// Make every subsequent `write_balance` fail.
    pub fn fail_balance_writes(&self, fail: bool) {
        if let Ok(mut s) = self.state.lock() {
            s.fail_balance_writes = fail;
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> Result<T, MirrorsError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| MirrorsError::Ledger("memory store poisoned".into()))?;
        Ok(f(&mut state))
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn read_install_flag(&self) -> Result<bool, MirrorsError> {
        self.with_state(|s| s.install_flag)
    }

    fn write_install_flag(&self) -> Result<(), MirrorsError> {
        self.with_state(|s| s.install_flag = true)
    }

    fn read_balance(&self) -> Result<Option<u32>, MirrorsError> {
        self.with_state(|s| s.balance)
    }

    fn write_balance(&self, balance: u32) -> Result<(), MirrorsError> {
        self.with_state(|s| {
            if s.fail_balance_writes {
                return Err(MirrorsError::Ledger("balance write refused".into()));
            }
            s.balance = Some(balance);
            Ok(())
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_store(dir: &TempDir) -> FileLedgerStore {
        FileLedgerStore::new(
            dir.path().join("data").join("snaps.json"),
            dir.path().join("config").join("install-id"),
        )
    }

    #[test]
    fn test_file_store_fresh_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        assert!(!store.read_install_flag().unwrap());
        assert_eq!(store.read_balance().unwrap(), None);
    }

    #[test]
    fn test_file_store_balance_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        store.write_balance(7).unwrap();
        assert_eq!(store.read_balance().unwrap(), Some(7));

        let raw = std::fs::read_to_string(store.balance_path()).unwrap();
        assert_eq!(raw, r#"{"snapsCount":7}"#);
    }

    #[test]
    fn test_file_store_install_flag() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        store.write_install_flag().unwrap();
        assert!(store.read_install_flag().unwrap());
        // Marker lives apart from the balance.
        assert!(!store.balance_path().exists());
    }

    #[test]
    fn test_file_store_corrupt_balance() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        std::fs::create_dir_all(store.balance_path().parent().unwrap()).unwrap();
        std::fs::write(store.balance_path(), "not json").unwrap();
        assert!(matches!(
            store.read_balance(),
            Err(MirrorsError::Ledger(_))
        ));
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("value.json");
        atomic_write(&path, b"1").unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["value.json".to_string()]);
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let a = MemoryLedgerStore::new();
        let b = a.clone();
        a.write_balance(3).unwrap();
        a.write_install_flag().unwrap();
        assert_eq!(b.read_balance().unwrap(), Some(3));
        assert!(b.read_install_flag().unwrap());

        b.clear_balance();
        assert_eq!(a.read_balance().unwrap(), None);
        assert!(a.read_install_flag().unwrap());
    }

    #[test]
    fn test_memory_store_failing_writes() {
        let store = MemoryLedgerStore::new();
        store.fail_balance_writes(true);
        assert!(store.write_balance(1).is_err());
        assert_eq!(store.read_balance().unwrap(), None);
    }
}
