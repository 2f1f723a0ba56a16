use crate::bucket::Bucket;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering::*};

const DEFAULT_NUM_BUCKETS: usize = 16;

// Grow when len / num_buckets > 3/4, kept in integer form.
const LOAD_FACTOR_NUM: usize = 3;
const LOAD_FACTOR_DEN: usize = 4;

fn hash<K: Hash + ?Sized, S: BuildHasher>(key: &K, build_hasher: &S) -> u64 {
    let mut hasher = build_hasher.build_hasher();
    key.hash(&mut hasher);
    hasher.finish()
}

struct RawTable<K, V> {
    buckets: Box<[Bucket<K, V>]>,
}

impl<K, V> RawTable<K, V> {
    fn with_num_buckets(num_buckets: usize) -> Self {
        let buckets = (0..num_buckets).map(|_| Bucket::new()).collect::<Vec<_>>();
        RawTable {
            buckets: buckets.into_boxed_slice(),
        }
    }

    fn bucket_index(&self, hash: u64) -> usize {
        // num_buckets is not forced to a power of two, so index by modulo
        // rather than masking high bits.
        (hash % self.buckets.len() as u64) as usize
    }

    fn bucket_for_hash(&self, hash: u64) -> &Bucket<K, V> {
        let index = self.bucket_index(hash);
        &self.buckets[index]
    }
}

/// A thread-safe hash map with per-bucket locking and automatic doubling.
///
/// The outer `RwLock` guards the bucket array itself: every operation reads
/// the array under the shared side, and a resize replaces it under the
/// exclusive side. Coordinator access always precedes bucket access, which
/// is what makes a computed bucket index valid for as long as it is used.
pub struct HashMap<K, V, S = crate::DefaultHashBuilder> {
    raw: RwLock<RawTable<K, V>>,
    len: AtomicUsize,
    build_hasher: S,
}

impl<K, V> HashMap<K, V, crate::DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map with `num_buckets` buckets. A zero count falls back to
    /// the default of 16 rather than failing.
    pub fn with_num_buckets(num_buckets: usize) -> Self {
        Self::with_num_buckets_and_hasher(num_buckets, crate::DefaultHashBuilder::default())
    }
}

impl<K, V, S> HashMap<K, V, S> {
    pub fn with_hasher(build_hasher: S) -> Self {
        Self::with_num_buckets_and_hasher(DEFAULT_NUM_BUCKETS, build_hasher)
    }

    pub fn with_num_buckets_and_hasher(num_buckets: usize, build_hasher: S) -> Self {
        let num_buckets = if num_buckets == 0 {
            DEFAULT_NUM_BUCKETS
        } else {
            num_buckets
        };
        Self {
            raw: RwLock::new(RawTable::with_num_buckets(num_buckets)),
            len: AtomicUsize::new(0),
            build_hasher,
        }
    }

    /// Number of live entries. A plain atomic load; never blocks on any
    /// bucket lock.
    pub fn len(&self) -> usize {
        self.len.load(Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current bucket count. Only grows, and only by doubling.
    pub fn num_buckets(&self) -> usize {
        self.raw.read().buckets.len()
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn hash<Q: ?Sized + Hash>(&self, key: &Q) -> u64 {
        hash(key, &self.build_hasher)
    }

    /// Inserts a key-value pair, returning the previous value if the key
    /// was already present. An update in place leaves the entry count and
    /// the bucket layout untouched; only a fresh insert can trigger growth.
    pub fn insert(&self, key: K, val: V) -> Option<V> {
        let key_hash = self.hash(&key);

        let (old, num_buckets) = {
            let raw = self.raw.read();
            let old = raw.bucket_for_hash(key_hash).upsert(key, val);
            (old, raw.buckets.len())
        };

        if old.is_none() {
            // The load-factor check runs with no lock held; taking the
            // coordinator exclusively from inside the shared section would
            // deadlock against ourselves.
            let len = self.len.fetch_add(1, Relaxed) + 1;
            if len * LOAD_FACTOR_DEN > num_buckets * LOAD_FACTOR_NUM {
                self.try_grow();
            }
        }

        old
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        let key_hash = self.hash(key);
        let raw = self.raw.read();
        raw.bucket_for_hash(key_hash).find(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let key_hash = self.hash(key);
        let raw = self.raw.read();
        raw.bucket_for_hash(key_hash).contains(key)
    }

    /// Removes a key, returning its value. Removing an absent key is a
    /// no-op and leaves the entry count alone.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let key_hash = self.hash(key);

        let removed = {
            let raw = self.raw.read();
            raw.bucket_for_hash(key_hash).remove(key)
        };

        if removed.is_some() {
            self.len.fetch_sub(1, Relaxed);
        }
        removed
    }

    /// Doubles the bucket count and rehashes every entry, if this thread
    /// wins the claim. `try_write` is the single-flight gate: whoever takes
    /// the coordinator exclusively migrates, and every other thread that
    /// saw the threshold returns at once. A grow that loses the claim is
    /// re-triggered by the next fresh insert that still sees the table
    /// overloaded.
    fn try_grow(&self) {
        let mut raw = match self.raw.try_write() {
            Some(raw) => raw,
            None => return,
        };

        // Another thread may have grown the table between our threshold
        // check and the claim.
        let num_buckets = raw.buckets.len();
        if self.len.load(Relaxed) * LOAD_FACTOR_DEN <= num_buckets * LOAD_FACTOR_NUM {
            return;
        }

        let new_num_buckets = num_buckets * 2;
        let mut new_raw = RawTable::with_num_buckets(new_num_buckets);

        // Exclusive coordinator access means no operation is mid-flight
        // against any bucket, so the old buckets are drained through
        // `&mut` without touching their locks.
        for bucket in raw.buckets.iter_mut() {
            for entry in bucket.take_entries() {
                let key_hash = hash(&entry.key, &self.build_hasher);
                let index = new_raw.bucket_index(key_hash);
                new_raw.buckets[index].transfer(entry);
            }
        }

        *raw = new_raw;
    }
}

impl<K, V, S> std::fmt::Debug for HashMap<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashMap").field("len", &self.len()).finish()
    }
}
