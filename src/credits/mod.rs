// src/credits/mod.rs — Snap credit ledger
//
// State machine: the balance only ever goes down by one per consumed review.
// Seeding is the single increment path and happens once per install identity.

pub mod log;
pub mod store;

use std::sync::Mutex;

use crate::infra::errors::MirrorsError;

pub use log::{
    JsonTransactionLog, MemoryTransactionLog, SnapTransaction, TransactionKind, TransactionLog,
};
pub use store::{FileLedgerStore, LedgerStore, MemoryLedgerStore};

/// Owns the snap balance. Build once at startup and share by `Arc`.
pub struct CreditLedger {
    balance: Mutex<u32>,
    store: Box<dyn LedgerStore>,
    log: Box<dyn TransactionLog>,
}

impl CreditLedger {
    /// Seed on first launch, restore afterwards.
    ///
    /// A present install flag with no stored balance means app data was
    /// cleared; the ledger restores 0 instead of granting credits again.
    pub fn initialize(
        store: Box<dyn LedgerStore>,
        log: Box<dyn TransactionLog>,
        initial_count: u32,
    ) -> Result<Self, MirrorsError> {
        let balance = if store.read_install_flag()? {
            let restored = store.read_balance()?.unwrap_or(0);
            tracing::debug!(balance = restored, "Restored snap balance");
            restored
        } else {
            tracing::info!(balance = initial_count, "First launch, seeding snap balance");
            let persisted = match store.write_balance(initial_count) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Failed to persist initial snap balance: {}", e);
                    false
                }
            };
            if let Err(e) = log.append(&SnapTransaction::init(initial_count)) {
                tracing::warn!("Failed to log init transaction: {}", e);
            }
            // Without a persisted balance the next launch must seed again.
            if persisted {
                if let Err(e) = store.write_install_flag() {
                    tracing::warn!("Failed to write install marker: {}", e);
                }
            }
            initial_count
        };

        Ok(Self {
            balance: Mutex::new(balance),
            store,
            log,
        })
    }

    pub fn balance(&self) -> u32 {
        self.balance.lock().map(|b| *b).unwrap_or(0)
    }

    pub fn has_available_snaps(&self) -> bool {
        self.balance() > 0
    }

    /// Consume one snap. Returns false, with no side effects, at zero.
    pub fn use_snap(&self) -> bool {
        let mut balance = match self.balance.lock() {
            Ok(b) => b,
            Err(_) => {
                tracing::error!("Snap ledger lock poisoned");
                return false;
            }
        };
        if *balance == 0 {
            return false;
        }

        let remaining = *balance - 1;
        // Persist first so a crash can never replay this decrement.
        if let Err(e) = self.store.write_balance(remaining) {
            tracing::warn!("Failed to persist snap balance {}: {}", remaining, e);
        }
        *balance = remaining;
        drop(balance);

        if let Err(e) = self.log.append(&SnapTransaction::consumption()) {
            tracing::warn!("Failed to log consumption transaction: {}", e);
        }
        tracing::debug!(remaining, "Snap consumed");
        true
    }

    /// Transaction history, oldest first. Read errors yield an empty list.
    pub fn transactions(&self) -> Vec<SnapTransaction> {
        self.log.entries().unwrap_or_else(|e| {
            tracing::warn!("Error loading transaction log: {}", e);
            Vec::new()
        })
    }
}
