use crate::sync;
use market::{Account, ExchangeError, Result, UserId, ValidationError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

#[derive(Default)]
struct AccountIndex {
    slots: HashMap<UserId, Arc<Mutex<Account>>>,
    /// Opening order.
    order: Vec<UserId>,
    usernames: HashSet<String>,
}

/// Every account, each behind its own lock.
#[derive(Default)]
pub(crate) struct AccountBook {
    index: RwLock<AccountIndex>,
}

impl AccountBook {
    /// Inserts `account` unless its username is taken. `persist` runs under
    /// the index lock, so a failed write leaves the book unchanged.
    pub(crate) fn insert_with(
        &self,
        account: Account,
        persist: impl FnOnce(&Account) -> Result<()>,
    ) -> Result<Account> {
        let mut index = sync::write(&self.index);
        if index.usernames.contains(account.username()) {
            return Err(ValidationError::DuplicateUsername(account.username().to_string()).into());
        }
        persist(&account)?;

        let user_id = account.user_id();
        index.usernames.insert(account.username().to_string());
        index.order.push(user_id);
        index
            .slots
            .insert(user_id, Arc::new(Mutex::new(account.clone())));
        Ok(account)
    }

    pub(crate) fn slot(&self, user_id: UserId) -> Result<Arc<Mutex<Account>>> {
        sync::read(&self.index)
            .slots
            .get(&user_id)
            .cloned()
            .ok_or(ExchangeError::UserNotFound(user_id))
    }

    pub(crate) fn get(&self, user_id: UserId) -> Result<Account> {
        let slot = self.slot(user_id)?;
        let account = sync::lock(&slot).clone();
        Ok(account)
    }

    /// Copies of every account in opening order.
    pub(crate) fn snapshot(&self) -> Vec<Account> {
        let slots: Vec<Arc<Mutex<Account>>> = {
            let index = sync::read(&self.index);
            index
                .order
                .iter()
                .filter_map(|id| index.slots.get(id).cloned())
                .collect()
        };
        slots.iter().map(|slot| sync::lock(slot).clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        sync::read(&self.index).order.len()
    }
}
