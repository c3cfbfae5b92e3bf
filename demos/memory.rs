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

use lockcache::{Cache, Mode};

fn main() {
    // 64 KiB quota, 4 KiB zeroed and aligned buffer per entry.
    let cache: Cache<u64> = Cache::builder(64 * 1024).with_entry_size(4 * 1024).build().unwrap();

    let mut handle = cache.acquire(1, Mode::Write).unwrap();
    handle.value_mut().unwrap()[..5].copy_from_slice(b"hello");
    let handle = handle.downgrade();

    let other = cache.try_acquire(&1, Mode::Read).unwrap();
    assert_eq!(&other[..5], b"hello");
    drop((handle, other));

    assert!(cache.try_acquire(&2, Mode::Read).is_none());
    assert!(cache.remove(&1));
    assert!(!cache.contains(&1));
}
