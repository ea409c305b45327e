//! Per-key write serialization for the ledgers.
//!
//! Each ledger key (an order for payments, an oil type for stock) gets its own
//! async mutex. A writer holds the guard for the whole read-compute-write
//! sequence, so two writers on the same key never read the same prior balance.
//! Writers on different keys never contend.

use std::{fmt, sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{EngineError, OilType, ResultEngine};

pub(crate) const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum LedgerKey {
    Order(Uuid),
    Stock(OilType),
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order(id) => write!(f, "order {id}"),
            Self::Stock(oil_type) => write!(f, "{oil_type} oil stock"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct LedgerLocks {
    slots: DashMap<LedgerKey, Arc<Mutex<()>>>,
    timeout: Duration,
}

impl LedgerLocks {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            timeout,
        }
    }

    /// Waits for exclusive access to `key`.
    ///
    /// Gives up with [`EngineError::Conflict`] once the configured timeout
    /// elapses.
    pub(crate) async fn acquire(&self, key: LedgerKey) -> ResultEngine<LedgerGuard<'_>> {
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        match tokio::time::timeout(self.timeout, slot.lock_owned()).await {
            Ok(guard) => Ok(LedgerGuard {
                locks: self,
                key,
                guard: Some(guard),
            }),
            Err(_) => {
                self.release(key);
                tracing::warn!(%key, "ledger lock wait timed out");
                Err(EngineError::Conflict(format!("{key} is being modified")))
            }
        }
    }

    /// Drops the slot of `key` once no guard or waiter refers to it.
    fn release(&self, key: LedgerKey) {
        self.slots
            .remove_if(&key, |_, slot| Arc::strong_count(slot) == 1);
    }
}

/// Exclusive access to one ledger key. The slot is freed on drop when idle.
#[derive(Debug)]
pub(crate) struct LedgerGuard<'a> {
    locks: &'a LedgerLocks,
    key: LedgerKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LedgerGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(self.key);
    }
}
