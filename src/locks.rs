use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::AccountId;

/// Per-account mutual exclusion for balance mutations. A guard is held
/// across the full read -> validate -> evaluate -> mutate -> persist
/// sequence, so at most one mutation per account is ever in flight.
/// Display reads take no lock.
#[derive(Default)]
pub struct AccountLocks {
    inner: parking_lot::Mutex<HashMap<AccountId, Arc<AsyncMutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, account: &AccountId) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock();
        map.entry(account.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    pub async fn lock(&self, account: &AccountId) -> OwnedMutexGuard<()> {
        self.entry(account).lock_owned().await
    }

    /// Lock two distinct accounts in identifier order, never in argument
    /// order, so concurrent transfers cannot deadlock.
    pub async fn lock_pair(
        &self,
        a: &AccountId,
        b: &AccountId,
    ) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        debug_assert_ne!(a, b);
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let first_guard = self.entry(first).lock_owned().await;
        let second_guard = self.entry(second).lock_owned().await;
        (first_guard, second_guard)
    }
}
