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

use std::hash::{BuildHasher, Hasher};

/// A cheap hasher for integer keys.
///
/// Keys such as content hashes are already well distributed, so they are only folded and then multiplied by the
/// 64-bit golden ratio. The multiplication keeps the low bits of sequential keys distinct and spreads every key
/// bit into the high bits, which `hashbrown` uses as its per-slot tag. Longer byte streams are folded by
/// rotate-and-xor first.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntHasher {
    state: u64,
}

impl IntHasher {
    const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;

    fn fold(&mut self, bits: u32, v: u64) {
        self.state = self.state.rotate_left(bits) ^ v;
    }
}

impl Hasher for IntHasher {
    fn finish(&self) -> u64 {
        self.state.wrapping_mul(Self::GOLDEN)
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.fold(8, *byte as u64);
        }
    }

    fn write_u8(&mut self, i: u8) {
        self.fold(8, i as u64)
    }

    fn write_u16(&mut self, i: u16) {
        self.fold(16, i as u64)
    }

    fn write_u32(&mut self, i: u32) {
        self.fold(32, i as u64)
    }

    fn write_u64(&mut self, i: u64) {
        self.fold(64, i)
    }

    fn write_usize(&mut self, i: usize) {
        self.fold(usize::BITS, i as u64)
    }

    fn write_i32(&mut self, i: i32) {
        self.write_u32(i as u32)
    }

    fn write_i64(&mut self, i: i64) {
        self.write_u64(i as u64)
    }
}

impl BuildHasher for IntHasher {
    type Hasher = Self;

    fn build_hasher(&self) -> Self::Hasher {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_int_hasher() {
        let hasher = IntHasher::default();
        assert_eq!(hasher.hash_one(0u32), 0);
        assert_eq!(hasher.hash_one(1u32), 0x9e37_79b9_7f4a_7c15);
        assert_eq!(hasher.hash_one(1u64), hasher.hash_one(1u32));
        assert_ne!(hasher.hash_one(1u32), hasher.hash_one(2u32));
    }

    #[test]
    fn test_int_hasher_bytes() {
        let mut hasher = IntHasher::default();
        hasher.write(&[0x12, 0x34]);
        assert_eq!(hasher.finish(), 0x09d3_c4a1_17da_ae44);
    }

    #[test]
    fn test_small_keys_spread_into_high_bits() {
        let hasher = IntHasher::default();

        // hashbrown tags slots with the top 7 bits of the hash.
        let tags = (0..128u32).map(|key| hasher.hash_one(key) >> 57).collect::<HashSet<_>>();
        assert!(tags.len() >= 100, "only {} distinct tags", tags.len());

        // Sequential keys still land in distinct buckets.
        let buckets = (0..1024u32).map(|key| hasher.hash_one(key) & 1023).collect::<HashSet<_>>();
        assert_eq!(buckets.len(), 1024);
    }
}
