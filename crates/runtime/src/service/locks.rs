//! Per-match serialization locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use arena_core::MatchId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lazily created async mutex per match.
///
/// The outer std mutex only guards the map and is never held across an
/// await. Different matches never contend with each other. A slot lives only
/// while someone holds or waits on it: every [`MatchLease`] drops its slot on
/// the way out unless another caller has cloned it in the meantime.
#[derive(Clone, Default)]
pub(crate) struct MatchLocks {
    slots: Arc<Mutex<HashMap<MatchId, Arc<AsyncMutex<()>>>>>,
}

/// Exclusive access to one match, released on drop.
pub(crate) struct MatchLease {
    guard: Option<OwnedMutexGuard<()>>,
    id: MatchId,
    locks: MatchLocks,
}

impl Drop for MatchLease {
    fn drop(&mut self) {
        // The guard holds a reference to the slot; drop it before counting.
        self.guard.take();
        self.locks.release(self.id);
    }
}

impl MatchLocks {
    pub(crate) async fn acquire(&self, id: MatchId) -> MatchLease {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(id).or_default())
        };
        MatchLease {
            guard: Some(slot.lock_owned().await),
            id,
            locks: self.clone(),
        }
    }

    /// Drop the slot unless someone still holds or waits on it.
    ///
    /// Holders and waiters clone the slot under the map lock, so a count of
    /// one (the map's own reference) means nobody can be using it.
    fn release(&self, id: MatchId) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots
            .get(&id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&id);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
