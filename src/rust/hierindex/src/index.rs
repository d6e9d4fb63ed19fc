use indexmap::IndexMap;
use roaring::RoaringBitmap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{QueryCache, Slots};
use crate::config::IndexConfig;
use crate::error::Result;
use crate::key::Key;
use crate::record::{Attributes, IntoRecord, Record};

/// Read-only parent/child index over a flat list of records.
///
/// Records live in an arena in input order and are addressed by slot.
/// `by_id` preserves first-insertion order, so a duplicate id replaces the
/// earlier record in place; `children` keeps every record under its parent,
/// duplicates included.
///
/// Slots are `u32`, so one index holds at most `u32::MAX + 1` records.
/// Building a larger one panics.
#[derive(Debug)]
pub struct HierarchicalIndex<P = Attributes> {
    records: Vec<Record<P>>,
    by_id: IndexMap<Key, u32, FxBuildHasher>,
    children: FxHashMap<Key, Vec<u32>>,
    roots: Vec<u32>,
    cache: QueryCache,
    config: IndexConfig,
}

impl<P> HierarchicalIndex<P> {
    /// Build an index, validating each item in turn.
    ///
    /// Fails on the first item whose `id` or `parent` has an unsupported
    /// type; no partially built index is returned.
    pub fn build<R, I>(items: I) -> Result<Self>
    where
        R: IntoRecord<P>,
        I: IntoIterator<Item = R>,
    {
        Self::build_with(IndexConfig::default(), items)
    }

    pub fn build_with<R, I>(config: IndexConfig, items: I) -> Result<Self>
    where
        R: IntoRecord<P>,
        I: IntoIterator<Item = R>,
    {
        let mut index = Self::empty(config);
        let mut duplicates = 0usize;

        for (position, item) in items.into_iter().enumerate() {
            let record = item.into_record(position)?;
            if index.insert(record) {
                duplicates += 1;
            }
        }

        debug!(
            records = index.records.len(),
            ids = index.by_id.len(),
            duplicates,
            roots = index.roots.len(),
            memoize = config.memoize,
            "built hierarchical index"
        );
        Ok(index)
    }

    /// Build from already-typed records. This cannot fail.
    pub fn from_records(records: impl IntoIterator<Item = Record<P>>) -> Self {
        Self::from_records_with(IndexConfig::default(), records)
    }

    pub fn from_records_with(
        config: IndexConfig,
        records: impl IntoIterator<Item = Record<P>>,
    ) -> Self {
        let mut index = Self::empty(config);
        for record in records {
            index.insert(record);
        }
        debug!(
            records = index.records.len(),
            ids = index.by_id.len(),
            "built hierarchical index"
        );
        index
    }

    fn empty(config: IndexConfig) -> Self {
        Self {
            records: Vec::with_capacity(config.capacity),
            by_id: IndexMap::with_capacity_and_hasher(config.capacity, FxBuildHasher),
            children: FxHashMap::with_capacity_and_hasher(config.capacity, FxBuildHasher),
            roots: Vec::new(),
            cache: QueryCache::new(config.memoize),
            config,
        }
    }

    /// Returns true when the record's id was already present.
    fn insert(&mut self, record: Record<P>) -> bool {
        let slot = next_slot(self.records.len());

        let replaced = self.by_id.insert(record.id.clone(), slot);
        if let Some(previous) = replaced {
            warn!(id = %record.id, previous, slot, "duplicate id replaces earlier record");
        }

        match &record.parent {
            Some(parent) => self.children.entry(parent.clone()).or_default().push(slot),
            None => self.roots.push(slot),
        }

        self.records.push(record);
        replaced.is_some()
    }

    fn record(&self, slot: u32) -> &Record<P> {
        &self.records[slot as usize]
    }

    fn resolve(&self, slots: &[u32]) -> Vec<&Record<P>> {
        slots.iter().map(|&slot| self.record(slot)).collect()
    }

    /// Every indexed record, in first-insertion order of its id.
    pub fn get_all(&self) -> Vec<&Record<P>> {
        self.by_id.values().map(|&slot| self.record(slot)).collect()
    }

    pub fn get_item(&self, id: &Key) -> Option<&Record<P>> {
        self.by_id.get(id).map(|&slot| self.record(slot))
    }

    /// Direct children of `id` in input order; empty for unknown ids.
    pub fn get_children(&self, id: &Key) -> Vec<&Record<P>> {
        self.children
            .get(id)
            .map(|slots| self.resolve(slots))
            .unwrap_or_default()
    }

    /// All descendants of `id` in pre-order: each child is followed by its
    /// own descendants before the next sibling.
    pub fn get_all_descendants(&self, id: &Key) -> Vec<&Record<P>> {
        if !self.children.contains_key(id) {
            return Vec::new();
        }
        let slots = self.cache.descendants(id, || self.descendant_slots(id));
        self.resolve(&slots)
    }

    /// The parent chain of `id`, nearest ancestor first and root last.
    pub fn get_all_ancestors(&self, id: &Key) -> Vec<&Record<P>> {
        self.resolve(&self.ancestors(id))
    }

    /// Records whose parent is null, in input order.
    pub fn roots(&self) -> Vec<&Record<P>> {
        self.resolve(&self.roots)
    }

    /// Number of resolvable ancestors, or `None` for an unknown id.
    pub fn depth(&self, id: &Key) -> Option<usize> {
        self.by_id.contains_key(id).then(|| self.ancestors(id).len())
    }

    pub fn contains(&self, id: &Key) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    fn ancestors(&self, id: &Key) -> Slots {
        if !self.by_id.contains_key(id) {
            return Slots::from(Vec::new());
        }
        self.cache.ancestors(id, || self.ancestor_slots(id))
    }

    fn descendant_slots(&self, id: &Key) -> Vec<u32> {
        let mut out = Vec::new();
        // Frames are (slot, depth); `path[..depth]` holds the ids from the
        // queried id down to the frame's parent.
        let mut stack: Vec<(u32, usize)> = match self.children.get(id) {
            Some(slots) => slots.iter().rev().map(|&slot| (slot, 1)).collect(),
            None => return out,
        };
        let mut path: Vec<&Key> = vec![id];

        while let Some((slot, depth)) = stack.pop() {
            path.truncate(depth);
            let record = self.record(slot);
            // Only an id already on the current path is a cycle; the same id
            // under two different parents is just a duplicate.
            if path.contains(&&record.id) {
                warn!(%id, revisited = %record.id, "parent cycle in descendant walk");
                continue;
            }
            out.push(slot);
            if let Some(grandchildren) = self.children.get(&record.id) {
                path.push(&record.id);
                stack.extend(grandchildren.iter().rev().map(|&child| (child, depth + 1)));
            }
        }
        out
    }

    fn ancestor_slots(&self, id: &Key) -> Vec<u32> {
        let mut out = Vec::new();
        let Some(&start) = self.by_id.get(id) else {
            return out;
        };

        let mut visited = RoaringBitmap::new();
        visited.insert(start);

        let mut current = self.record(start);
        while let Some(parent_id) = &current.parent {
            let Some(&slot) = self.by_id.get(parent_id) else {
                break;
            };
            if !visited.insert(slot) {
                warn!(%id, revisited = %parent_id, "parent cycle in ancestor walk");
                break;
            }
            out.push(slot);
            current = self.record(slot);
        }
        out
    }
}

/// Slot for the record stored after `len` others.
///
/// # Panics
///
/// Panics once an index would hold more than `u32::MAX + 1` records, rather
/// than wrapping and aliasing an earlier slot.
fn next_slot(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| {
        panic!(
            "hierarchical index holds at most {} records",
            u64::from(u32::MAX) + 1
        )
    })
}

impl HierarchicalIndex<Attributes> {
    /// Build from JSON record objects.
    pub fn from_json_values(values: impl IntoIterator<Item = Value>) -> Result<Self> {
        Self::build(values)
    }

    /// Parse a JSON array of record objects and build an index from it.
    pub fn from_json_str(input: &str) -> Result<Self> {
        Self::from_json_str_with(IndexConfig::default(), input)
    }

    pub fn from_json_str_with(config: IndexConfig, input: &str) -> Result<Self> {
        let values: Vec<Value> = serde_json::from_str(input)?;
        Self::build_with(config, values)
    }
}

impl<P> FromIterator<Record<P>> for HierarchicalIndex<P> {
    fn from_iter<T: IntoIterator<Item = Record<P>>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}
