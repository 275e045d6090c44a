//! Per-class identifier allocation on top of the store's atomic counter.

use std::sync::Arc;

use super::ports::{KeyValueStore, StoreError, StoreKey};

/// Entity classes that receive their own id sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    /// User accounts.
    User,
    /// Posted updates.
    Update,
}

impl EntityClass {
    /// Counter record backing the class's sequence.
    pub fn counter_key(self) -> StoreKey {
        match self {
            Self::User => StoreKey::user_counter(),
            Self::Update => StoreKey::update_counter(),
        }
    }
}

/// Issues strictly increasing, never reused ids.
///
/// Relies solely on the store's native increment; there is no in-process
/// state, so any number of allocators may share one store.
#[derive(Clone)]
pub struct IdAllocator {
    store: Arc<dyn KeyValueStore>,
}

impl IdAllocator {
    /// Create an allocator over the shared store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Allocate the next id for `class`. The first id of an empty class is 1.
    ///
    /// # Errors
    ///
    /// Propagates store failures; no id is considered allocated in that case.
    /// A non-positive counter value is reported as [`StoreError::Corrupt`].
    pub async fn next_id(&self, class: EntityClass) -> Result<u64, StoreError> {
        let key = class.counter_key();
        let raw = self.store.increment(&key).await?;
        u64::try_from(raw)
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| StoreError::corrupt(key.as_str(), format!("counter returned {raw}")))
    }
}
