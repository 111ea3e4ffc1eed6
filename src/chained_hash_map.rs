//! ChainedHashMap: public map over the chain layer, with hashing, the key
//! contract checks and the resize policy.

use crate::chain::{Chain, Chains, Node};
use crate::config::{ConfigError, MapConfig, ResizePolicy, MAX_BUCKET_COUNT};
use crate::contract::{self, ChainWalk};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::mem;
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;
use slotmap::DefaultKey;

/// A hash map that resolves collisions by separate chaining.
///
/// Each key is hashed once per operation; the bucket is `hash % bucket_count`
/// and the bucket's chain is scanned with `K: Eq`. Under the default
/// `ResizePolicy::Fixed` the bucket count never changes on its own, so
/// chains grow with the number of entries.
pub struct ChainedHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    chains: Chains<K, V>,
    policy: ResizePolicy,
    walk: ChainWalk,
}

impl<K, V> ChainedHashMap<K, V> {
    /// An empty map with `DEFAULT_CAPACITY` buckets and no resizing.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// An empty map with `capacity` buckets and no resizing.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(MapConfig::new().capacity(capacity))
    }

    /// An empty map shaped by `config`. Fails with `ZeroCapacity`,
    /// `TooManyBuckets` or `InvalidLoadFactor` when `config` is invalid.
    pub fn with_config(config: MapConfig) -> Result<Self, ConfigError> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    /// An empty map with the default configuration, hashing keys with `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        Self::build(MapConfig::new(), hasher)
    }

    /// Like `with_config`, hashing keys with `hasher`. Same `ConfigError` cases.
    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, hasher))
    }

    fn build(config: MapConfig, hasher: S) -> Self {
        Self {
            hasher,
            chains: Chains::with_buckets(config.bucket_capacity()),
            policy: config.resize_policy(),
            walk: ChainWalk::new(),
        }
    }

    /// Number of entries. Same as `len`.
    pub fn size(&self) -> usize {
        self.chains.len()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.len() == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.chains.bucket_count()
    }

    /// `len / bucket_count`.
    pub fn load_factor(&self) -> f64 {
        self.chains.len() as f64 / self.chains.bucket_count() as f64
    }

    /// Length of the longest bucket chain. O(n).
    pub fn longest_chain(&self) -> usize {
        self.chains.longest_chain()
    }

    pub fn resize_policy(&self) -> ResizePolicy {
        self.policy
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Remove every entry, keeping the current bucket count.
    pub fn clear(&mut self) {
        self.chains.clear();
    }

    /// Relink all entries into `bucket_count` buckets using their stored
    /// hashes. Works under either resize policy; `K: Hash` is not called.
    /// Fails with `ZeroCapacity` or `TooManyBuckets` and leaves the map as is.
    pub fn rebucket(&mut self, bucket_count: usize) -> Result<(), ConfigError> {
        ConfigError::check_bucket_count(bucket_count)?;
        self.chains.rebucket(bucket_count);
        Ok(())
    }

    /// Entries of one bucket in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.bucket_count()`.
    pub fn bucket(&self, index: usize) -> BucketIter<'_, K, V> {
        assert!(
            index < self.chains.bucket_count(),
            "bucket index {} out of range for {} buckets",
            index,
            self.chains.bucket_count()
        );
        BucketIter {
            chain: self.chains.chain(index),
        }
    }

    /// All entries in storage order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.chains.nodes(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.chains.nodes_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, v)| v)
    }

    /// Grow ahead of one more insert when the policy asks for it. Growth
    /// stops at `MAX_BUCKET_COUNT`; past that, chains absorb the load.
    fn reserve_one(&mut self) {
        let ResizePolicy::Grow { max_load_factor } = self.policy else {
            return;
        };
        let wanted = (self.chains.len() + 1) as f64;
        let mut target = self.chains.bucket_count();
        while wanted / target as f64 > max_load_factor && target < MAX_BUCKET_COUNT {
            target = (target * 2).min(MAX_BUCKET_COUNT);
        }
        if target != self.chains.bucket_count() {
            self.chains.rebucket(target);
        }
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn locate<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _w = self.walk.enter();
        let hash = self.make_hash(q);
        self.chains.find(hash, q)
    }

    /// Insert or update. A present key keeps its identity and gets `value`;
    /// an absent key is appended to its bucket.
    pub fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    /// Like `put`, returning the replaced value when the key was present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (hash, found) = {
            let _w = self.walk.enter();
            let hash = self.make_hash(&key);
            contract::assert_stable_hash(hash, || self.make_hash(&key));
            (hash, self.chains.find(hash, &key))
        };
        match found {
            Some(slot) => Some(mem::replace(&mut self.chains.node_mut(slot).value, value)),
            None => {
                self.reserve_one();
                self.chains.push_back(key, value, hash);
                None
            }
        }
    }

    /// The value stored for `q`, or `None` when the key is absent.
    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.locate(q)?;
        Some(&self.chains.node(slot).value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.locate(q)?;
        let node = self.chains.node(slot);
        Some((&node.key, &node.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.locate(q)?;
        Some(&mut self.chains.node_mut(slot).value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate(q).is_some()
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.locate(q)?;
        let node = self.chains.unlink(slot)?;
        Some((node.key, node.value))
    }
}

impl<K, V, S: Default> Default for ChainedHashMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Equal when both maps hold the same keys with equal values; bucket
/// layout and resize policy are ignored.
impl<K, V, S> PartialEq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| v == ov))
    }
}

impl<K, V, S> Eq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

/// Collects into a map with the default configuration.
impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

/// Iterator over immutable entries in `ChainedHashMap`.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Node<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, n)| (&n.key, &n.value))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over mutable entries in `ChainedHashMap`.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Node<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, n)| (&n.key, &mut n.value))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator over the entries of a `ChainedHashMap`.
pub struct IntoIter<K, V> {
    it: slotmap::basic::IntoIter<DefaultKey, Node<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, n)| (n.key, n.value))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Entries of a single bucket, head to tail.
pub struct BucketIter<'a, K, V> {
    chain: Chain<'a, K, V>,
}

impl<'a, K, V> Iterator for BucketIter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.chain.next().map(|(_, n)| (&n.key, &n.value))
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for ChainedHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            it: self.chains.into_nodes(),
        }
    }
}
