use parking_lot::RwLock;
use std::borrow::Borrow;
use std::mem;

pub const ENTRIES_PER_BUCKET: usize = 8;

pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

/// A single slot of the table: an entry vector guarded by its own lock.
///
/// Entry order within a bucket is not meaningful; lookups are linear scans
/// and removal may reorder the survivors. The locked methods (`find`,
/// `upsert`, `remove`) hold the bucket lock for their full duration. The
/// `&mut self` methods bypass the lock entirely and are reserved for the
/// resize path, which owns the whole table exclusively.
pub struct Bucket<K, V> {
    entries: RwLock<Vec<Entry<K, V>>>,
}

impl<K, V> Bucket<K, V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::with_capacity(ENTRIES_PER_BUCKET)),
        }
    }

    pub fn take_entries(&mut self) -> Vec<Entry<K, V>> {
        mem::replace(self.entries.get_mut(), Vec::new())
    }

    pub fn transfer(&mut self, entry: Entry<K, V>) {
        self.entries.get_mut().push(entry);
    }
}

impl<K, V> Bucket<K, V>
where
    K: Eq,
{
    pub fn find<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        V: Clone,
    {
        let entries = self.entries.read();
        entries
            .iter()
            .find(|entry| entry.key.borrow() == key)
            .map(|entry| entry.value.clone())
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let entries = self.entries.read();
        entries.iter().any(|entry| entry.key.borrow() == key)
    }

    /// Replaces the value in place when the key is present and returns the
    /// old value; appends a fresh entry and returns `None` otherwise. The
    /// caller owns the table's entry counter and the load-factor check.
    pub fn upsert(&self, key: K, value: V) -> Option<V> {
        let mut entries = self.entries.write();
        for entry in entries.iter_mut() {
            if entry.key == key {
                return Some(mem::replace(&mut entry.value, value));
            }
        }
        entries.push(Entry { key, value });
        None
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut entries = self.entries.write();
        let pos = entries.iter().position(|entry| entry.key.borrow() == key)?;
        Some(entries.swap_remove(pos).value)
    }
}
