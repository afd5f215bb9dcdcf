//! GroupedMetadataStore: public, thread-safe surface over `GroupMap`.
//!
//! Every operation takes the instance mutex for the duration of its
//! in-memory work only. Change listeners run after the mutex is released,
//! and enumeration hands out owned snapshots, so no call ever returns
//! while still holding the lock.

use crate::entry::{Entry, Snapshot};
use crate::error::{check_group, check_names, StoreError};
use crate::group_map::GroupMap;
use crate::signal::{ChangeSignal, Subscription};
use core::hash::BuildHasher;
use hashbrown::hash_map::DefaultHashBuilder;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A `group -> key -> value` store shared between threads.
///
/// Groups are created on first insert and removed with their last key.
/// Successful mutations that change the contents fire the change signal
/// exactly once; see [`GroupedMetadataStore::subscribe`].
pub struct GroupedMetadataStore<V, S = DefaultHashBuilder> {
    map: Mutex<GroupMap<V, S>>,
    changed: ChangeSignal,
}

impl<V> GroupedMetadataStore<V>
where
    V: Clone,
{
    pub fn new() -> Self {
        Self::from_map(GroupMap::new())
    }

    /// Create a store with room for `groups` groups before reallocating.
    pub fn with_capacity(groups: usize) -> Self {
        Self::from_map(GroupMap::with_capacity_and_hasher(groups, Default::default()))
    }
}

impl<V> Default for GroupedMetadataStore<V>
where
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> GroupedMetadataStore<V, S>
where
    V: Clone,
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::from_map(GroupMap::with_hasher(hasher))
    }

    fn from_map(map: GroupMap<V, S>) -> Self {
        Self {
            map: Mutex::new(map),
            changed: ChangeSignal::new(),
        }
    }

    // Each mutation is applied to `GroupMap` in one step that runs no user
    // code, so the structure is consistent even if another holder panicked.
    fn lock(&self) -> MutexGuard<'_, GroupMap<V, S>> {
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener for the no-payload change signal.
    ///
    /// The listener runs synchronously on the mutating thread after the
    /// store lock has been released; it may read or mutate this store.
    /// It carries no payload: re-read the store to observe the new state.
    ///
    /// A panic in a listener does not skip the other listeners. It is
    /// resumed from the mutating call (`add`, `set`, `remove`, `clear`)
    /// after every listener has run; the mutation itself is already
    /// committed by then.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.changed.subscribe(listener)
    }

    /// Detach a listener. Returns false if the token was already removed.
    ///
    /// Each dispatch works on the listener list as it was when the signal
    /// fired. A signal already being dispatched on another thread may
    /// therefore still call the listener once after this returns `true`.
    /// Later signals never reach it.
    pub fn unsubscribe(&self, token: Subscription) -> bool {
        self.changed.unsubscribe(token)
    }

    /// Insert a new `(group, key)` pair.
    ///
    /// Fails with `DuplicateKey` if the pair already exists; the store is
    /// then unchanged and no signal fires.
    pub fn add(&self, group: &str, key: &str, value: V) -> Result<(), StoreError> {
        check_names(group, key)?;
        self.lock().insert(group, key, value)?;
        log::trace!("added {group}/{key}");
        self.changed.fire();
        Ok(())
    }

    pub fn add_entry(&self, entry: Entry<V>) -> Result<(), StoreError> {
        let (group, key, value) = entry.into_parts();
        self.add(&group, &key, value)
    }

    /// Insert or overwrite the value at `(group, key)`.
    pub fn set(&self, group: &str, key: &str, value: V) -> Result<(), StoreError> {
        check_names(group, key)?;
        let old = self.lock().upsert(group, key, value);
        log::trace!(
            "{} {group}/{key}",
            if old.is_some() { "replaced" } else { "inserted" }
        );
        self.changed.fire();
        Ok(())
    }

    pub fn set_entry(&self, entry: Entry<V>) -> Result<(), StoreError> {
        let (group, key, value) = entry.into_parts();
        self.set(&group, &key, value)
    }

    /// Remove `(group, key)`, dropping the group if it becomes empty.
    ///
    /// Returns `Ok(false)` without firing when the pair is absent.
    pub fn remove(&self, group: &str, key: &str) -> Result<bool, StoreError> {
        check_names(group, key)?;
        // Old values are dropped outside the lock.
        let old = self.lock().remove(group, key);
        match old {
            Some(_) => {
                log::trace!("removed {group}/{key}");
                self.changed.fire();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove_entry(&self, entry: &Entry<V>) -> Result<bool, StoreError> {
        self.remove(entry.group(), entry.key())
    }

    /// Empty the store. Fires only if there was something to remove.
    pub fn clear(&self) {
        let removed = self.lock().clear();
        if removed > 0 {
            log::trace!("cleared {removed} entries");
            self.changed.fire();
        }
    }

    /// Value stored at `(group, key)`.
    pub fn get(&self, group: &str, key: &str) -> Result<V, StoreError> {
        check_names(group, key)?;
        let map = self.lock();
        match map.get(group, key) {
            Some(v) => Ok(v.clone()),
            None if map.contains_group(group) => Err(StoreError::key_not_found(group, key)),
            None => Err(StoreError::group_not_found(group)),
        }
    }

    pub fn get_entry(&self, group: &str, key: &str) -> Result<Entry<V>, StoreError> {
        let value = self.get(group, key)?;
        Ok(Entry::new(group, key, value))
    }

    /// Like `get`, but a missing (or empty) group or key is simply `None`.
    pub fn try_get(&self, group: &str, key: &str) -> Option<V> {
        self.lock().get(group, key).cloned()
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.lock().contains_group(group)
    }

    pub fn contains_key(&self, group: &str, key: &str) -> bool {
        self.lock().contains_key(group, key)
    }

    /// Linear scan over every group for an equal value.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.lock().contains_value(value)
    }

    /// True if the entry's pair is present and holds an equal value.
    pub fn contains_entry(&self, entry: &Entry<V>) -> bool
    where
        V: PartialEq,
    {
        self.lock()
            .get(entry.group(), entry.key())
            .is_some_and(|v| v == entry.value())
    }

    /// Total number of entries over all groups.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.lock().group_count()
    }

    /// Number of keys in `group`; `KeyNotFound` if the group is absent.
    pub fn count_keys(&self, group: &str) -> Result<usize, StoreError> {
        check_group(group)?;
        self.lock()
            .group_len(group)
            .ok_or_else(|| StoreError::group_not_found(group))
    }

    pub fn group_names(&self) -> Vec<String> {
        self.lock().group_names()
    }

    /// Point-in-time copy of one group's entries.
    ///
    /// Fails immediately with `KeyNotFound` if the group does not exist.
    /// The returned iterator holds no lock and does not see later writes.
    pub fn group(&self, group: &str) -> Result<Snapshot<V>, StoreError> {
        check_group(group)?;
        let entries = self
            .lock()
            .group_entries(group)
            .ok_or_else(|| StoreError::group_not_found(group))?;
        Ok(Snapshot::new(entries))
    }

    /// Point-in-time copy of every entry, in unspecified order.
    pub fn snapshot(&self) -> Snapshot<V> {
        Snapshot::new(self.lock().entries())
    }

    /// Copy every entry into `dest` starting at `start`.
    ///
    /// Returns the number of entries written. If they do not fit, fails
    /// with `IndexOutOfRange` and leaves `dest` untouched.
    pub fn copy_to(
        &self,
        dest: &mut [Option<Entry<V>>],
        start: usize,
    ) -> Result<usize, StoreError> {
        let entries = self.lock().entries();
        let needed = entries.len();
        let end = start
            .checked_add(needed)
            .filter(|&end| end <= dest.len())
            .ok_or(StoreError::IndexOutOfRange {
                start,
                needed,
                capacity: dest.len(),
            })?;
        for (slot, e) in dest[start..end].iter_mut().zip(entries) {
            *slot = Some(e);
        }
        Ok(needed)
    }
}

/// Clone locks only the source. The copy has its own lock and starts with
/// no subscribers.
impl<V, S> Clone for GroupedMetadataStore<V, S>
where
    V: Clone,
    S: BuildHasher + Clone + Default,
{
    fn clone(&self) -> Self {
        let map = self.lock().clone();
        Self::from_map(map)
    }
}

impl<'a, V, S> IntoIterator for &'a GroupedMetadataStore<V, S>
where
    V: Clone,
    S: BuildHasher + Clone + Default,
{
    type Item = Entry<V>;
    type IntoIter = Snapshot<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshot()
    }
}

impl<V, S> core::fmt::Debug for GroupedMetadataStore<V, S>
where
    V: Clone + core::fmt::Debug,
    S: BuildHasher + Clone + Default + core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GroupedMetadataStore")
            .field("map", &*self.lock())
            .field("changed", &self.changed)
            .finish()
    }
}
