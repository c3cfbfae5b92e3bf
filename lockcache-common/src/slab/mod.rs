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

use std::num::NonZeroUsize;

/// Stable handle of a value stored in a [`Slab`].
///
/// A token stays valid until its value is removed. The slot may be reused afterwards, so a stale token must never be
/// dereferenced.
///
/// Stores `index + 1`, so `Option<Token>` is a single word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(NonZeroUsize);

impl Token {
    fn new(index: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(index))
    }

    /// Index of the slot in the slab.
    pub fn index(&self) -> usize {
        self.0.get() - 1
    }
}

/// A vector-backed arena. Vacant slots form an intrusive free list and are reused last-vacated first.
pub struct Slab<T> {
    slots: Vec<Slot<T>>,
    vacant: Option<usize>,
    len: usize,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slab<T> {
    /// Create an empty slab.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: None,
            len: 0,
        }
    }

    /// Create an empty slab with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            vacant: None,
            len: 0,
        }
    }

    /// Store a value and return its token.
    pub fn insert(&mut self, val: T) -> Token {
        self.len += 1;
        let Some(index) = self.vacant else {
            self.slots.push(Slot::Occupied(val));
            return Token::new(self.slots.len() - 1);
        };
        match std::mem::replace(&mut self.slots[index], Slot::Occupied(val)) {
            Slot::Vacant(next) => self.vacant = next,
            Slot::Occupied(_) => unreachable!("free list points to an occupied slot"),
        }
        Token::new(index)
    }

    /// Remove a value by token. Returns [`None`] if the slot is vacant.
    pub fn remove(&mut self, token: Token) -> Option<T> {
        let index = token.index();
        let slot = self.slots.get_mut(index)?;
        if let Slot::Vacant(_) = slot {
            return None;
        }
        let Slot::Occupied(val) = std::mem::replace(slot, Slot::Vacant(self.vacant)) else {
            unreachable!()
        };
        self.vacant = Some(index);
        self.len -= 1;
        Some(val)
    }

    /// Get the immutable reference of a value by token.
    pub fn get(&self, token: Token) -> Option<&T> {
        match self.slots.get(token.index()) {
            Some(Slot::Occupied(val)) => Some(val),
            _ => None,
        }
    }

    /// Get the mutable reference of a value by token.
    pub fn get_mut(&mut self, token: Token) -> Option<&mut T> {
        match self.slots.get_mut(token.index()) {
            Some(Slot::Occupied(val)) => Some(val),
            _ => None,
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots, occupied or vacant.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop the vacant slots after the last occupied one and release the spare memory.
    ///
    /// Tokens of occupied slots stay valid. The remaining vacant slots are reused lowest index first.
    pub fn shrink_to_fit(&mut self) {
        while let Some(Slot::Vacant(_)) = self.slots.last() {
            self.slots.pop();
        }
        self.slots.shrink_to_fit();

        self.vacant = None;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if let Slot::Vacant(next) = slot {
                *next = self.vacant;
                self.vacant = Some(index);
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Slot<T> {
    /// Next vacant slot.
    Vacant(Option<usize>),
    Occupied(T),
}

mod linked_list;

pub use linked_list::{Iter, SlabLinkedList};
