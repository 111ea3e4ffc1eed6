//! Chains: structural layer holding the bucket array and the linked nodes.
//!
//! Nodes live in a generational arena; each bucket records the head and tail
//! of its chain, and each node links to the next node of the same bucket.
//! Everything here works from the hash stored in the node, so nothing in
//! this module calls `K: Hash`. `find` is the only place that calls `K: Eq`.

use core::borrow::Borrow;
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
    next: Option<DefaultKey>,
}

#[derive(Copy, Clone, Debug, Default)]
struct Bucket {
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

#[derive(Debug)]
pub(crate) struct Chains<K, V> {
    buckets: Vec<Bucket>,
    nodes: SlotMap<DefaultKey, Node<K, V>>,
}

/// Walks one bucket's chain from head to tail.
pub(crate) struct Chain<'a, K, V> {
    nodes: &'a SlotMap<DefaultKey, Node<K, V>>,
    cursor: Option<DefaultKey>,
}

impl<'a, K, V> Iterator for Chain<'a, K, V> {
    type Item = (DefaultKey, &'a Node<K, V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.nodes.get(slot)?;
        self.cursor = node.next;
        Some((slot, node))
    }
}

impl<K, V> Chains<K, V> {
    pub(crate) fn with_buckets(bucket_count: usize) -> Self {
        debug_assert!(bucket_count > 0);
        Self {
            buckets: vec![Bucket::default(); bucket_count],
            nodes: SlotMap::with_key(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    pub(crate) fn chain(&self, bucket: usize) -> Chain<'_, K, V> {
        Chain {
            nodes: &self.nodes,
            cursor: self.buckets[bucket].head,
        }
    }

    /// Scan the bucket for `hash` and return the node whose key equals `q`.
    /// Stored hashes are compared first so `Eq` only runs on likely matches.
    pub(crate) fn find<Q>(&self, hash: u64, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.chain(self.bucket_of(hash))
            .find(|(_, n)| n.hash == hash && n.key.borrow() == q)
            .map(|(slot, _)| slot)
    }

    pub(crate) fn node(&self, slot: DefaultKey) -> &Node<K, V> {
        &self.nodes[slot]
    }

    pub(crate) fn node_mut(&mut self, slot: DefaultKey) -> &mut Node<K, V> {
        &mut self.nodes[slot]
    }

    /// Append a new node at the tail of its bucket.
    pub(crate) fn push_back(&mut self, key: K, value: V, hash: u64) -> DefaultKey {
        let slot = self.nodes.insert(Node {
            key,
            value,
            hash,
            next: None,
        });
        self.link_back(slot, hash);
        slot
    }

    fn link_back(&mut self, slot: DefaultKey, hash: u64) {
        let b = self.bucket_of(hash);
        match self.buckets[b].tail {
            Some(tail) => self.nodes[tail].next = Some(slot),
            None => self.buckets[b].head = Some(slot),
        }
        self.buckets[b].tail = Some(slot);
    }

    /// Remove a node from its chain and from the arena.
    pub(crate) fn unlink(&mut self, slot: DefaultKey) -> Option<Node<K, V>> {
        let b = self.bucket_of(self.nodes.get(slot)?.hash);

        let mut prev = None;
        let mut cursor = self.buckets[b].head;
        while let Some(c) = cursor {
            if c == slot {
                break;
            }
            prev = Some(c);
            cursor = self.nodes[c].next;
        }
        debug_assert_eq!(cursor, Some(slot), "node missing from its bucket chain");

        let node = self.nodes.remove(slot)?;
        match prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.buckets[b].head = node.next,
        }
        if self.buckets[b].tail == Some(slot) {
            self.buckets[b].tail = prev;
        }
        Some(node)
    }

    /// Relink every node into a fresh array of `bucket_count` buckets.
    ///
    /// Old buckets are drained in index order and each chain front to back,
    /// so a chain split by doubling keeps its relative order.
    pub(crate) fn rebucket(&mut self, bucket_count: usize) {
        debug_assert!(bucket_count > 0);
        let old = core::mem::replace(&mut self.buckets, vec![Bucket::default(); bucket_count]);
        for bucket in old {
            let mut cursor = bucket.head;
            while let Some(slot) = cursor {
                let node = &mut self.nodes[slot];
                cursor = node.next.take();
                let hash = node.hash;
                self.link_back(slot, hash);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.buckets.fill(Bucket::default());
    }

    pub(crate) fn longest_chain(&self) -> usize {
        (0..self.buckets.len())
            .map(|b| self.chain(b).count())
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn nodes(&self) -> slotmap::basic::Iter<'_, DefaultKey, Node<K, V>> {
        self.nodes.iter()
    }

    pub(crate) fn nodes_mut(&mut self) -> slotmap::basic::IterMut<'_, DefaultKey, Node<K, V>> {
        self.nodes.iter_mut()
    }

    pub(crate) fn into_nodes(self) -> slotmap::basic::IntoIter<DefaultKey, Node<K, V>> {
        self.nodes.into_iter()
    }

    /// Panics unless every structural invariant holds.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut seen = 0;
        for b in 0..self.buckets.len() {
            let mut last = None;
            for (slot, node) in self.chain(b) {
                assert_eq!(self.bucket_of(node.hash), b, "node in the wrong bucket");
                last = Some(slot);
                seen += 1;
                assert!(seen <= self.nodes.len(), "cycle in bucket chain");
            }
            assert_eq!(self.buckets[b].tail, last, "stale tail for bucket {}", b);
        }
        assert_eq!(seen, self.nodes.len(), "chains do not cover every node");
    }
}
