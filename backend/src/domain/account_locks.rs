//! Per-account write serialization.
//!
//! SQLite would serialize the writes anyway, but only after both writers
//! have opened their transactions, which ends in `SQLITE_BUSY` for one of
//! them. Taking the account lock before `begin` keeps ledger writes for the
//! same account strictly one after another.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct AccountLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

/// Held locks. Dropping it releases every account it covers.
pub struct AccountGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every listed account, in sorted order so two callers locking
    /// overlapping sets cannot deadlock. Duplicates are locked once.
    pub async fn lock_all<I, S>(&self, account_ids: I) -> AccountGuard
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ordered: BTreeSet<String> = account_ids.into_iter().map(Into::into).collect();

        let mutexes: Vec<Arc<Mutex<()>>> = {
            let mut locks = self.locks.lock().await;
            // Entries only the map still points at are idle
            locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
            ordered
                .iter()
                .map(|id| locks.entry(id.clone()).or_default().clone())
                .collect()
        };

        let mut guards = Vec::with_capacity(mutexes.len());
        for mutex in mutexes {
            guards.push(mutex.lock_owned().await);
        }
        AccountGuard { _guards: guards }
    }

    pub async fn lock(&self, account_id: &str) -> AccountGuard {
        self.lock_all([account_id]).await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_second_writer_waits_for_first() {
        let locks = AccountLocks::new();
        let guard = locks.lock("a").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("a").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender should acquire the lock once it is released")
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_accounts_do_not_block() {
        let locks = AccountLocks::new();
        let _a = locks.lock("a").await;

        tokio::time::timeout(Duration::from_secs(1), locks.lock("b"))
            .await
            .expect("an unrelated account must not be blocked");
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_locked_once() {
        let locks = AccountLocks::new();
        tokio::time::timeout(Duration::from_secs(1), locks.lock_all(["a", "a", "b"]))
            .await
            .expect("locking the same account twice in one call must not deadlock");
    }

    #[tokio::test]
    async fn test_idle_entries_are_dropped() {
        let locks = AccountLocks::new();
        drop(locks.lock_all(["a", "b"]).await);
        let _c = locks.lock("c").await;
        assert_eq!(locks.tracked().await, 1);
    }
}
