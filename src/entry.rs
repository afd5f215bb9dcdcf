//! Entry: immutable `(group, key, value)` triples and snapshot iteration.

/// A read-only copy of one slot of the store.
///
/// Entries own their fields; producing one does not keep any lock held.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entry<V> {
    group: String,
    key: String,
    value: V,
}

impl<V> Entry<V> {
    pub fn new(group: impl Into<String>, key: impl Into<String>, value: V) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
            value,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Split the entry back into its owned parts.
    pub fn into_parts(self) -> (String, String, V) {
        (self.group, self.key, self.value)
    }
}

/// Point-in-time sequence of entries.
///
/// Built under the store lock and handed out after the lock is released,
/// so iterating it never blocks writers and never observes later writes.
#[derive(Debug)]
pub struct Snapshot<V> {
    it: std::vec::IntoIter<Entry<V>>,
}

impl<V> Snapshot<V> {
    pub(crate) fn new(entries: Vec<Entry<V>>) -> Self {
        Self {
            it: entries.into_iter(),
        }
    }
}

impl<V> Iterator for Snapshot<V> {
    type Item = Entry<V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<V> ExactSizeIterator for Snapshot<V> {}

impl<V> core::iter::FusedIterator for Snapshot<V> {}
