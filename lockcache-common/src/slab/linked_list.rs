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

use super::{Slab, Token};

/// A doubly-linked list whose nodes live in a [`Slab`] and link to each other by [`Token`].
///
/// Tokens returned by [`SlabLinkedList::push_back`] stay valid while the node is linked, including across
/// [`SlabLinkedList::move_to_back`], so callers can keep them in an index for O(1) relinking.
pub struct SlabLinkedList<T> {
    slab: Slab<Node<T>>,
    head: Option<Token>,
    tail: Option<Token>,
}

struct Node<T> {
    val: T,

    prev: Option<Token>,
    next: Option<Token>,
}

impl<T> Default for SlabLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlabLinkedList<T> {
    /// Create an empty list.
    pub const fn new() -> Self {
        Self {
            slab: Slab::new(),
            head: None,
            tail: None,
        }
    }

    /// Create an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slab: Slab::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Token of the first node.
    pub fn front(&self) -> Option<Token> {
        self.head
    }

    /// Token of the last node.
    pub fn back(&self) -> Option<Token> {
        self.tail
    }

    /// Token of the node after `token`.
    ///
    /// # Panics
    ///
    /// Panics if `token` is not linked.
    pub fn next(&self, token: Token) -> Option<Token> {
        self.node(token).next
    }

    /// Token of the node before `token`.
    ///
    /// # Panics
    ///
    /// Panics if `token` is not linked.
    pub fn prev(&self, token: Token) -> Option<Token> {
        self.node(token).prev
    }

    /// Get the value of a linked node.
    pub fn get(&self, token: Token) -> Option<&T> {
        self.slab.get(token).map(|node| &node.val)
    }

    /// Get the mutable value of a linked node.
    pub fn get_mut(&mut self, token: Token) -> Option<&mut T> {
        self.slab.get_mut(token).map(|node| &mut node.val)
    }

    /// Append a value at the back and return the token of its node.
    pub fn push_back(&mut self, val: T) -> Token {
        let token = self.slab.insert(Node {
            val,
            prev: None,
            next: None,
        });
        self.link_back(token);
        token
    }

    /// Unlink the node of `token` and return its value. Returns [`None`] if the token is not linked.
    pub fn remove(&mut self, token: Token) -> Option<T> {
        self.slab.get(token)?;
        self.unlink(token);
        self.slab.remove(token).map(|node| node.val)
    }

    /// Remove the first node and return its value.
    pub fn pop_front(&mut self) -> Option<T> {
        self.head.and_then(|token| self.remove(token))
    }

    /// Relink a node at the back. Its token stays the same.
    ///
    /// # Panics
    ///
    /// Panics if `token` is not linked.
    pub fn move_to_back(&mut self, token: Token) {
        if self.tail == Some(token) {
            return;
        }
        self.unlink(token);
        self.link_back(token);
    }

    /// Iterate values from front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            token: self.head,
            list: self,
        }
    }

    /// Release the slots vacated at the end of the underlying slab. Tokens of linked nodes stay valid.
    pub fn shrink_to_fit(&mut self) {
        self.slab.shrink_to_fit();
    }

    /// Number of slots of the underlying slab, linked or vacant.
    pub fn capacity(&self) -> usize {
        self.slab.capacity()
    }

    /// Number of linked nodes.
    pub fn len(&self) -> usize {
        self.slab.len()
    }

    /// Returns `true` if the list has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node(&self, token: Token) -> &Node<T> {
        match self.slab.get(token) {
            Some(node) => node,
            None => panic!("token {token:?} is not linked"),
        }
    }

    fn node_mut(&mut self, token: Token) -> &mut Node<T> {
        match self.slab.get_mut(token) {
            Some(node) => node,
            None => panic!("token {token:?} is not linked"),
        }
    }

    fn unlink(&mut self, token: Token) {
        let (prev, next) = {
            let node = self.node_mut(token);
            (node.prev.take(), node.next.take())
        };

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    fn link_back(&mut self, token: Token) {
        let tail = self.tail;
        {
            let node = self.node_mut(token);
            node.prev = tail;
            node.next = None;
        }
        match tail {
            Some(tail) => self.node_mut(tail).next = Some(token),
            None => self.head = Some(token),
        }
        self.tail = Some(token);
    }
}

impl<T> Extend<T> for SlabLinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|elt| {
            self.push_back(elt);
        })
    }
}

impl<T> FromIterator<T> for SlabLinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

/// Front-to-back iterator over a [`SlabLinkedList`], yielding tokens with values.
pub struct Iter<'a, T: 'a> {
    token: Option<Token>,
    list: &'a SlabLinkedList<T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Token, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.token?;
        let node = self.list.node(token);
        self.token = node.next;
        Some((token, &node.val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.list.len()))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn values<T: Clone>(list: &SlabLinkedList<T>) -> Vec<T> {
        list.iter().map(|(_, v)| v.clone()).collect_vec()
    }

    fn assert_backward_links<T: Clone + PartialEq + std::fmt::Debug>(list: &SlabLinkedList<T>) {
        let mut backward = vec![];
        let mut token = list.back();
        while let Some(t) = token {
            backward.push(list.get(t).unwrap().clone());
            token = list.prev(t);
        }
        backward.reverse();
        assert_eq!(backward, values(list));
    }

    #[test]
    fn test_basic() {
        let mut list = SlabLinkedList::new();
        assert_eq!(list.pop_front(), None);

        let t1 = list.push_back(1);
        let t2 = list.push_back(2);
        let t3 = list.push_back(3);
        assert_eq!(list.len(), 3);
        assert_eq!(values(&list), vec![1, 2, 3]);
        assert_eq!(list.front(), Some(t1));
        assert_eq!(list.back(), Some(t3));
        assert_eq!(list.next(t1), Some(t2));
        assert_eq!(list.prev(t1), None);

        assert_eq!(list.remove(t2), Some(2));
        assert_eq!(list.remove(t2), None);
        assert_eq!(values(&list), vec![1, 3]);
        assert_backward_links(&list);

        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_front(), Some(3));
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_move_to_back_keeps_token() {
        let mut list = (0..5).collect::<SlabLinkedList<_>>();
        let tokens = list.iter().map(|(t, _)| t).collect_vec();

        list.move_to_back(tokens[0]);
        assert_eq!(values(&list), vec![1, 2, 3, 4, 0]);
        list.move_to_back(tokens[2]);
        assert_eq!(values(&list), vec![1, 3, 4, 0, 2]);
        // Moving the tail is a noop.
        list.move_to_back(tokens[2]);
        assert_eq!(values(&list), vec![1, 3, 4, 0, 2]);
        assert_backward_links(&list);

        assert_eq!(list.get(tokens[0]), Some(&0));
        *list.get_mut(tokens[4]).unwrap() = 40;
        assert_eq!(list.remove(tokens[4]), Some(40));
        assert_eq!(values(&list), vec![1, 3, 0, 2]);
        assert_backward_links(&list);
    }

    #[test]
    fn test_single_node() {
        let mut list = SlabLinkedList::new();
        let t = list.push_back("only");
        list.move_to_back(t);
        assert_eq!(list.front(), Some(t));
        assert_eq!(list.back(), Some(t));
        assert_eq!(list.remove(t), Some("only"));
        assert!(list.is_empty());
        let t = list.push_back("again");
        assert_eq!(list.front(), Some(t));
    }

    #[test]
    #[should_panic]
    fn test_move_unlinked_token() {
        let mut list = SlabLinkedList::new();
        let t = list.push_back(1);
        list.remove(t);
        list.move_to_back(t);
    }
}
