use crate::sync;
use market::{Transaction, UserId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Append-only transaction history, ordered by sequence.
pub(crate) struct TransactionLog {
    entries: RwLock<Vec<Transaction>>,
    next_sequence: AtomicU64,
}

impl TransactionLog {
    pub(crate) fn new(mut history: Vec<Transaction>) -> Self {
        history.sort_by_key(|tx| tx.sequence());
        let next = history.last().map_or(1, |tx| tx.sequence() + 1);
        Self {
            entries: RwLock::new(history),
            next_sequence: AtomicU64::new(next),
        }
    }

    /// Reserves the next sequence number. Numbers of aborted trades are
    /// never reused.
    pub(crate) fn next_sequence(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn append(&self, transaction: Transaction) {
        let mut entries = sync::write(&self.entries);
        let at = entries.partition_point(|tx| tx.sequence() < transaction.sequence());
        entries.insert(at, transaction);
    }

    pub(crate) fn list(&self, user_id: Option<UserId>) -> Vec<Transaction> {
        let entries = sync::read(&self.entries);
        match user_id {
            Some(id) => entries
                .iter()
                .filter(|tx| tx.user_id() == id)
                .cloned()
                .collect(),
            None => entries.clone(),
        }
    }
}
