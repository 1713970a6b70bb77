//! Bounded, time-expiring LRU cache.
//!
//! Entries live in an arena (`Vec` of slots) and are threaded into a
//! doubly-linked recency list through `prev`/`next` slot indices, with a hash
//! map from key to slot. `get` and `set` are O(1); the diagnostics that walk
//! the list are O(size). The head of the list is the most recently used entry.
//!
//! An entry whose expiry instant has been reached is logically absent: `get`
//! removes it and reports a miss, and `set` replaces it with a brand new
//! entry instead of refreshing it in place.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use fxquote_common::as_millis_u64;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    expires_at: Instant,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<K, V> Entry<K, V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Expiry state of a single key, as reported by [`ExpiringLruCache::expirations`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyExpiry<K> {
    pub key: K,
    pub is_expired: bool,
    /// Time left before expiry, clamped to zero.
    pub ms_until_expiration: u64,
}

/// Fixed-capacity key→value cache with a uniform TTL and LRU eviction.
#[derive(Debug)]
pub struct ExpiringLruCache<K, V> {
    slots: Vec<Option<Entry<K, V>>>,
    free: Vec<usize>,
    index: HashMap<K, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    capacity: usize,
    ttl: Duration,
}

impl<K, V> ExpiringLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache. A zero capacity is raised to one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
            capacity,
            ttl,
        }
    }

    /// Look up `key`, promoting it to most recently used on a hit.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let idx = *self.index.get(key)?;
        let now = Instant::now();

        if self.entry(idx).is_expired(now) {
            self.remove_slot(idx);
            return None;
        }

        self.move_to_head(idx);
        Some(self.entry(idx).value.clone())
    }

    /// Insert or refresh `key`.
    ///
    /// A live entry gets the new value, a fresh TTL and moves to the front.
    /// An expired entry is dropped and re-inserted as new. Inserting a new
    /// key into a full cache evicts the least recently used entry first.
    pub fn set(&mut self, key: K, value: V) {
        let now = Instant::now();
        let expires_at = now + self.ttl;

        if let Some(&idx) = self.index.get(&key) {
            if !self.entry(idx).is_expired(now) {
                let entry = self.entry_mut(idx);
                entry.value = value;
                entry.expires_at = expires_at;
                self.move_to_head(idx);
                return;
            }
            self.remove_slot(idx);
        }

        if self.index.len() >= self.capacity {
            self.evict_lru();
        }

        let idx = self.alloc(Entry {
            key: key.clone(),
            value,
            expires_at,
            prev: None,
            next: None,
        });
        self.push_head(idx);
        self.index.insert(key, idx);
    }

    /// Remove `key`, returning its value if it was present (expired or not).
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = *self.index.get(key)?;
        self.remove_slot(idx).map(|entry| entry.value)
    }

    /// Drop every logically expired entry, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<usize> = self
            .iter_slots()
            .filter(|&idx| self.entry(idx).is_expired(now))
            .collect();
        for &idx in &expired {
            self.remove_slot(idx);
        }
        expired.len()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Most recently used key.
    pub fn most_recent_key(&self) -> Option<K> {
        self.head.map(|idx| self.entry(idx).key.clone())
    }

    /// Least recently used key, the next eviction candidate.
    pub fn least_recent_key(&self) -> Option<K> {
        self.tail.map(|idx| self.entry(idx).key.clone())
    }

    /// Keys from most to least recently used.
    pub fn ordered_keys(&self) -> Vec<K> {
        self.iter_slots()
            .map(|idx| self.entry(idx).key.clone())
            .collect()
    }

    /// `(key, value)` pairs from most to least recently used.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.iter_slots()
            .map(|idx| {
                let entry = self.entry(idx);
                (entry.key.clone(), entry.value.clone())
            })
            .collect()
    }

    /// Expiry state of every key, from most to least recently used.
    pub fn expirations(&self) -> Vec<KeyExpiry<K>> {
        let now = Instant::now();
        self.iter_slots()
            .map(|idx| {
                let entry = self.entry(idx);
                KeyExpiry {
                    key: entry.key.clone(),
                    is_expired: entry.is_expired(now),
                    ms_until_expiration: as_millis_u64(
                        entry.expires_at.saturating_duration_since(now),
                    ),
                }
            })
            .collect()
    }

    fn iter_slots(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.head, move |&idx| self.entry(idx).next)
    }

    // Slot indices reachable from `index`, `head`, `tail` or a link are
    // always occupied.
    fn entry(&self, idx: usize) -> &Entry<K, V> {
        self.slots[idx]
            .as_ref()
            .unwrap_or_else(|| unreachable!("dangling cache slot {idx}"))
    }

    fn entry_mut(&mut self, idx: usize) -> &mut Entry<K, V> {
        self.slots[idx]
            .as_mut()
            .unwrap_or_else(|| unreachable!("dangling cache slot {idx}"))
    }

    fn alloc(&mut self, entry: Entry<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let entry = self.entry(idx);
            (entry.prev, entry.next)
        };

        match prev {
            Some(p) => self.entry_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.entry_mut(n).prev = prev,
            None => self.tail = prev,
        }

        let entry = self.entry_mut(idx);
        entry.prev = None;
        entry.next = None;
    }

    fn push_head(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let entry = self.entry_mut(idx);
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(h) => self.entry_mut(h).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn move_to_head(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_head(idx);
    }

    fn remove_slot(&mut self, idx: usize) -> Option<Entry<K, V>> {
        self.unlink(idx);
        let entry = self.slots[idx].take()?;
        self.index.remove(&entry.key);
        self.free.push(idx);
        Some(entry)
    }

    fn evict_lru(&mut self) {
        if let Some(idx) = self.tail {
            self.remove_slot(idx);
        }
    }
}
