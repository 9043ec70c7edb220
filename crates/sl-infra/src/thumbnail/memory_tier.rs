//! In-memory thumbnail tier with entry and byte ceilings.

use std::collections::{HashMap, VecDeque};

use sl_core::thumbnail::ThumbnailKey;

/// Strict LRU map bounded by entry count and by total bytes.
///
/// `order` runs from least to most recently used; every `get` and `put`
/// moves the key to the back.
pub struct MemoryTier {
    entries: HashMap<ThumbnailKey, Vec<u8>>,
    order: VecDeque<ThumbnailKey>,
    max_entries: usize,
    max_bytes: usize,
    current_bytes: usize,
}

impl MemoryTier {
    pub fn new(max_entries: usize, max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries,
            max_bytes,
            current_bytes: 0,
        }
    }

    pub fn get(&mut self, key: &ThumbnailKey) -> Option<Vec<u8>> {
        let bytes = self.entries.get(key)?.clone();
        self.touch(key);
        Some(bytes)
    }

    /// Insert `bytes`, evicting by byte pressure first and by count second.
    ///
    /// An entry larger than the byte ceiling is not stored. Returns the
    /// evicted keys, oldest first.
    pub fn put(&mut self, key: ThumbnailKey, bytes: Vec<u8>) -> Vec<ThumbnailKey> {
        self.remove(&key);

        let mut evicted = Vec::new();
        if bytes.len() > self.max_bytes {
            return evicted;
        }

        while self.current_bytes + bytes.len() > self.max_bytes {
            match self.pop_oldest() {
                Some(old) => evicted.push(old),
                None => break,
            }
        }

        self.current_bytes += bytes.len();
        self.entries.insert(key.clone(), bytes);
        self.order.push_back(key);

        while self.entries.len() > self.max_entries {
            match self.pop_oldest() {
                Some(old) => evicted.push(old),
                None => break,
            }
        }
        evicted
    }

    pub fn remove(&mut self, key: &ThumbnailKey) -> Option<Vec<u8>> {
        let bytes = self.entries.remove(key)?;
        self.current_bytes = self.current_bytes.saturating_sub(bytes.len());
        self.order.retain(|k| k != key);
        Some(bytes)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.current_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.current_bytes
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn contains(&self, key: &ThumbnailKey) -> bool {
        self.entries.contains_key(key)
    }

    fn touch(&mut self, key: &ThumbnailKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn pop_oldest(&mut self) -> Option<ThumbnailKey> {
        let oldest = self.order.pop_front()?;
        if let Some(bytes) = self.entries.remove(&oldest) {
            self.current_bytes = self.current_bytes.saturating_sub(bytes.len());
        }
        Some(oldest)
    }
}
