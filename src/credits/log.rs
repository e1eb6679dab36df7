// src/credits/log.rs — Append-only snap transaction log
//
// The log is an audit trail. The ledger's balance is authoritative; nothing
// here is ever replayed to compute it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::store::atomic_write;
use crate::infra::errors::MirrorsError;
use crate::infra::paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Init,
    Consumption,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapTransaction {
    pub id: Uuid,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl SnapTransaction {
    pub fn new(amount: i64, kind: TransactionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn init(amount: u32) -> Self {
        Self::new(i64::from(amount), TransactionKind::Init)
    }

    pub fn consumption() -> Self {
        Self::new(-1, TransactionKind::Consumption)
    }
}

pub trait TransactionLog: Send + Sync {
    fn append(&self, transaction: &SnapTransaction) -> Result<(), MirrorsError>;
    fn entries(&self) -> Result<Vec<SnapTransaction>, MirrorsError>;
}

/// JSON array of transactions in a single file.
#[derive(Debug, Clone)]
pub struct JsonTransactionLog {
    path: PathBuf,
}

impl JsonTransactionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Self {
        Self::new(paths::transaction_log_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TransactionLog for JsonTransactionLog {
    fn append(&self, transaction: &SnapTransaction) -> Result<(), MirrorsError> {
        // An unreadable log is started over rather than blocking new entries.
        let mut transactions = self.entries().unwrap_or_else(|e| {
            tracing::warn!("Error loading transaction log: {}", e);
            Vec::new()
        });
        transactions.push(transaction.clone());

        let json = serde_json::to_vec_pretty(&transactions)
            .map_err(|e| MirrorsError::Ledger(e.to_string()))?;
        atomic_write(&self.path, &json)
    }

    fn entries(&self) -> Result<Vec<SnapTransaction>, MirrorsError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|e| {
            MirrorsError::Ledger(format!("corrupt transaction log {}: {e}", self.path.display()))
        })
    }
}

/// In-memory log; clones share entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransactionLog {
    entries: Arc<Mutex<Vec<SnapTransaction>>>,
    fail_appends: Arc<Mutex<bool>>,
}

impl MemoryTransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `append` fail.
    pub fn fail_appends(&self, fail: bool) {
        if let Ok(mut f) = self.fail_appends.lock() {
            *f = fail;
        }
    }
}

impl TransactionLog for MemoryTransactionLog {
    fn append(&self, transaction: &SnapTransaction) -> Result<(), MirrorsError> {
        if self.fail_appends.lock().map(|f| *f).unwrap_or(false) {
            return Err(MirrorsError::Ledger("transaction log unavailable".into()));
        }
        self.entries
            .lock()
            .map_err(|_| MirrorsError::Ledger("memory log poisoned".into()))?
            .push(transaction.clone());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<SnapTransaction>, MirrorsError> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .map_err(|_| MirrorsError::Ledger("memory log poisoned".into()))
    }
}
