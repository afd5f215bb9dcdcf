//! GroupMap: structural layer holding the two-level `group -> key -> value`
//! mapping. Not synchronized; `GroupedMetadataStore` wraps it in a mutex.
//!
//! Every method leaves the structure satisfying:
//! - keys are unique within a group;
//! - no group maps to an empty key set;
//! - `len()` equals the sum of the group sizes.

use crate::entry::Entry;
use crate::error::StoreError;
use core::hash::BuildHasher;
use hashbrown::hash_map::{DefaultHashBuilder, Entry as SlotEntry, HashMap};

type Keys<V, S> = HashMap<String, V, S>;

#[derive(Clone, Debug)]
pub(crate) struct GroupMap<V, S = DefaultHashBuilder> {
    groups: HashMap<String, Keys<V, S>, S>,
    hasher: S,
}

impl<V> GroupMap<V> {
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<V, S> GroupMap<V, S>
where
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub fn with_capacity_and_hasher(groups: usize, hasher: S) -> Self {
        Self {
            groups: HashMap::with_capacity_and_hasher(groups, hasher.clone()),
            hasher,
        }
    }

    /// Total number of entries across every group.
    pub fn len(&self) -> usize {
        self.groups.values().map(|keys| keys.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        // Groups are never empty, so no groups means no entries.
        self.groups.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group_len(&self, group: &str) -> Option<usize> {
        self.groups.get(group).map(|keys| keys.len())
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    pub fn contains_key(&self, group: &str, key: &str) -> bool {
        self.get(group, key).is_some()
    }

    pub fn get(&self, group: &str, key: &str) -> Option<&V> {
        self.groups.get(group)?.get(key)
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.groups
            .values()
            .any(|keys| keys.values().any(|v| v == value))
    }

    /// Insert a new pair; fails without side effects if the pair exists.
    ///
    /// A missing group is only materialized together with its first entry,
    /// so a rejected insert never leaves an empty group behind.
    pub fn insert(&mut self, group: &str, key: &str, value: V) -> Result<(), StoreError> {
        match self.groups.get_mut(group) {
            Some(keys) => match keys.entry(key.to_owned()) {
                SlotEntry::Occupied(_) => Err(StoreError::DuplicateKey {
                    group: group.to_owned(),
                    key: key.to_owned(),
                }),
                SlotEntry::Vacant(v) => {
                    v.insert(value);
                    Ok(())
                }
            },
            None => {
                let keys = self.singleton(key, value);
                self.groups.insert(group.to_owned(), keys);
                Ok(())
            }
        }
    }

    /// Insert or overwrite; returns the previous value if one was replaced.
    pub fn upsert(&mut self, group: &str, key: &str, value: V) -> Option<V> {
        match self.groups.get_mut(group) {
            Some(keys) => keys.insert(key.to_owned(), value),
            None => {
                let keys = self.singleton(key, value);
                self.groups.insert(group.to_owned(), keys);
                None
            }
        }
    }

    /// Remove a pair, dropping its group when the group becomes empty.
    pub fn remove(&mut self, group: &str, key: &str) -> Option<V> {
        let keys = self.groups.get_mut(group)?;
        let value = keys.remove(key)?;
        if keys.is_empty() {
            self.groups.remove(group);
        }
        Some(value)
    }

    /// Drop every group; returns how many entries were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.len();
        self.groups.clear();
        removed
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn group_entries(&self, group: &str) -> Option<Vec<Entry<V>>>
    where
        V: Clone,
    {
        let keys = self.groups.get(group)?;
        Some(
            keys.iter()
                .map(|(k, v)| Entry::new(group, k.as_str(), v.clone()))
                .collect(),
        )
    }

    pub fn entries(&self) -> Vec<Entry<V>>
    where
        V: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        for (g, keys) in self.groups.iter() {
            out.extend(
                keys.iter()
                    .map(|(k, v)| Entry::new(g.as_str(), k.as_str(), v.clone())),
            );
        }
        out
    }

    fn singleton(&self, key: &str, value: V) -> Keys<V, S> {
        let mut keys = HashMap::with_capacity_and_hasher(1, self.hasher.clone());
        keys.insert(key.to_owned(), value);
        keys
    }
}
