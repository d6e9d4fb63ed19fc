use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::trace;

use crate::key::Key;

/// Slots of records, in the order a query returns them.
pub(crate) type Slots = Arc<[u32]>;

/// Per-identifier memo of traversal results.
///
/// Entries are filled lazily and never invalidated; this is only sound
/// because the owning index never changes after construction. Two readers
/// computing the same key concurrently both produce equal slot lists, so
/// whichever insert wins is fine.
#[derive(Debug, Default)]
pub(crate) struct QueryCache {
    enabled: bool,
    descendants: RwLock<FxHashMap<Key, Slots>>,
    ancestors: RwLock<FxHashMap<Key, Slots>>,
}

impl QueryCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn descendants(&self, id: &Key, compute: impl FnOnce() -> Vec<u32>) -> Slots {
        self.lookup(&self.descendants, "descendants", id, compute)
    }

    pub fn ancestors(&self, id: &Key, compute: impl FnOnce() -> Vec<u32>) -> Slots {
        self.lookup(&self.ancestors, "ancestors", id, compute)
    }

    fn lookup(
        &self,
        table: &RwLock<FxHashMap<Key, Slots>>,
        kind: &'static str,
        id: &Key,
        compute: impl FnOnce() -> Vec<u32>,
    ) -> Slots {
        if !self.enabled {
            return Slots::from(compute());
        }

        if let Some(hit) = table.read().get(id) {
            trace!(%id, kind, "query cache hit");
            return Arc::clone(hit);
        }

        // Computed outside the lock; a racing reader may insert first.
        let slots = Slots::from(compute());
        Arc::clone(table.write().entry(id.clone()).or_insert(slots))
    }

    #[cfg(test)]
    pub fn len(&self) -> (usize, usize) {
        (self.descendants.read().len(), self.ancestors.read().len())
    }
}
