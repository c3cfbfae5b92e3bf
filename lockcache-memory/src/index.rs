// Copyright 2025 foyer Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::hash::Hash;

use equivalent::Equivalent;
use hashbrown::HashMap;
use lockcache_common::{
    code::{HashBuilder, Key},
    slab::{SlabLinkedList, Token},
    strict_assert_eq,
};

use crate::record::Record;

/// The key index and the recency list of a cache, always mutated together.
///
/// The list is ordered from the least recently used record at the front to the most recently used one at the back.
/// Every key in the index maps to the token of a record in the list, and every record in the list is indexed.
pub struct Index<K, V, S> {
    tokens: HashMap<K, Token, S>,
    records: SlabLinkedList<Record<K, V>>,
}

impl<K, V, S> Index<K, V, S>
where
    K: Key,
    S: HashBuilder,
{
    const MIN_SHRINK_CAPACITY: usize = 64;

    pub fn new(hash_builder: S) -> Self {
        Self {
            tokens: HashMap::with_hasher(hash_builder),
            records: SlabLinkedList::new(),
        }
    }

    /// Look up the token of a key.
    pub fn get<Q>(&self, key: &Q) -> Option<Token>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.tokens.get(key).copied()
    }

    /// Get the record of a linked token.
    ///
    /// # Panics
    ///
    /// Panics if the token is not linked.
    pub fn record(&self, token: Token) -> &Record<K, V> {
        match self.records.get(token) {
            Some(record) => record,
            None => panic!("token {token:?} is indexed but not linked"),
        }
    }

    /// Insert a record at the most recently used end.
    ///
    /// # Panics
    ///
    /// Panics if the key is already indexed.
    pub fn insert(&mut self, record: Record<K, V>) -> Token {
        let key = record.key().clone();
        let token = self.records.push_back(record);
        let old = self.tokens.insert(key, token);
        assert!(old.is_none(), "duplicated key in index");
        token
    }

    /// Mark a record as the most recently used one.
    pub fn touch(&mut self, token: Token) {
        self.records.move_to_back(token);
    }

    /// Unlink a record from both the index and the list.
    ///
    /// # Panics
    ///
    /// Panics if the token is not linked.
    pub fn unlink(&mut self, token: Token) -> Record<K, V> {
        let record = match self.records.remove(token) {
            Some(record) => record,
            None => panic!("token {token:?} is indexed but not linked"),
        };
        let indexed = self.tokens.remove(record.key());
        strict_assert_eq!(indexed, Some(token));
        record
    }

    /// Token of the least recently used record.
    pub fn front(&self) -> Option<Token> {
        self.records.front()
    }

    /// Token of the record used right after the given one.
    pub fn next(&self, token: Token) -> Option<Token> {
        self.records.next(token)
    }

    /// Iterate records from the least to the most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &Record<K, V>> {
        self.records.iter().map(|(_, record)| record)
    }

    /// Unlink every record, from the least to the most recently used.
    pub fn drain(&mut self) -> impl Iterator<Item = Record<K, V>> + '_ {
        self.tokens.clear();
        std::iter::from_fn(move || self.records.pop_front())
    }

    /// Release the memory of the key index and of the recency list once they have become sparse.
    pub fn shrink(&mut self) {
        let len = self.records.len();

        let capacity = self.tokens.capacity();
        if capacity > Self::MIN_SHRINK_CAPACITY && capacity > len * 4 {
            self.tokens.shrink_to_fit();
            tracing::trace!(
                "[index]: shrink index capacity {capacity} => {}",
                self.tokens.capacity()
            );
        }

        let slots = self.records.capacity();
        if slots > Self::MIN_SHRINK_CAPACITY && slots > len * 4 {
            self.records.shrink_to_fit();
            tracing::trace!("[index]: shrink list slots {slots} => {}", self.records.capacity());
        }
    }

    pub fn len(&self) -> usize {
        strict_assert_eq!(self.tokens.len(), self.records.len());
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub fn capacity(&self) -> (usize, usize) {
        (self.tokens.capacity(), self.records.capacity())
    }

    #[cfg(test)]
    pub fn keys(&self) -> Vec<K> {
        let keys: Vec<K> = self.iter().map(|record| record.key().clone()).collect();
        lockcache_common::strict_assert!(keys.iter().all(|key| self.tokens.contains_key(key)));
        keys
    }
}

#[cfg(test)]
mod tests {
    use lockcache_common::hasher::IntHasher;

    use super::*;

    fn index_for_test(keys: impl IntoIterator<Item = u32>) -> Index<u32, (), IntHasher> {
        let mut index = Index::new(IntHasher::default());
        for key in keys {
            index.insert(Record::new(key, 1, ()));
        }
        index
    }

    #[test]
    fn test_insert_touch_unlink() {
        let mut index = index_for_test(1..=4);
        assert_eq!(index.keys(), vec![1, 2, 3, 4]);
        assert_eq!(index.len(), 4);

        let t2 = index.get(&2).unwrap();
        assert_eq!(index.record(t2).key(), &2);
        index.touch(t2);
        assert_eq!(index.keys(), vec![1, 3, 4, 2]);

        let t1 = index.get(&1).unwrap();
        let record = index.unlink(t1);
        assert_eq!(record.key(), &1);
        assert_eq!(index.get(&1), None);
        assert_eq!(index.keys(), vec![3, 4, 2]);

        // The key can be inserted again after it was unlinked.
        index.insert(Record::new(1, 1, ()));
        assert_eq!(index.keys(), vec![3, 4, 2, 1]);
    }

    #[test]
    #[should_panic(expected = "duplicated key in index")]
    fn test_duplicated_key() {
        let mut index = index_for_test([1, 2]);
        index.insert(Record::new(2, 1, ()));
    }

    #[test]
    fn test_walk_from_front() {
        let index = index_for_test([5, 3, 9]);
        let mut walked = vec![];
        let mut cursor = index.front();
        while let Some(token) = cursor {
            walked.push(*index.record(token).key());
            cursor = index.next(token);
        }
        assert_eq!(walked, vec![5, 3, 9]);
    }

    #[test]
    fn test_drain_and_shrink() {
        let mut index = index_for_test(0..1024);
        let (tokens, slots) = index.capacity();
        assert_eq!(slots, 1024);

        let drained = index.drain().map(|record| *record.key()).collect::<Vec<_>>();
        assert_eq!(drained, (0..1024).collect::<Vec<_>>());
        assert!(index.is_empty());

        index.shrink();
        let (shrunk_tokens, shrunk_slots) = index.capacity();
        assert!(shrunk_tokens < tokens);
        assert_eq!(shrunk_slots, 0);
    }

    #[test]
    fn test_shrink_keeps_live_records() {
        let mut index = index_for_test(0..1024);
        // Unlink everything but a few records at the front of the slab.
        for key in 8..1024 {
            let token = index.get(&key).unwrap();
            index.unlink(token);
        }
        index.shrink();
        assert_eq!(index.capacity().1, 8);
        assert_eq!(index.keys(), (0..8).collect::<Vec<_>>());

        for key in 0..8 {
            let token = index.get(&key).unwrap();
            assert_eq!(index.record(token).key(), &key);
        }
        index.insert(Record::new(100, 1, ()));
        assert_eq!(index.keys(), vec![0, 1, 2, 3, 4, 5, 6, 7, 100]);
    }
}
