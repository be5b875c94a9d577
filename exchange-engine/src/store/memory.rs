use super::{Snapshot, Store, TradeCommit};
use crate::sync;
use market::{Account, Stock, StoreError};
use std::sync::Mutex;

/// Store that keeps the snapshot in process memory. State is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing snapshot, e.g. a fixture in tests.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        sync::lock(&self.state).clone()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        let snapshot = self.snapshot();
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn persist_stock(&self, stock: &Stock) -> Result<(), StoreError> {
        sync::lock(&self.state).upsert_stock(stock);
        Ok(())
    }

    fn persist_account(&self, account: &Account) -> Result<(), StoreError> {
        sync::lock(&self.state).upsert_account(account);
        Ok(())
    }

    fn persist_trade(&self, commit: &TradeCommit<'_>) -> Result<(), StoreError> {
        sync::lock(&self.state).apply_trade(commit);
        Ok(())
    }
}
