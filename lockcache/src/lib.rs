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

#![cfg_attr(docsrs, feature(doc_cfg))]

//! lockcache is a concurrent, cost-bounded LRU cache that hands out locked entries.
//!
//! Every cached entry is guarded by its own reader-writer lock. Acquiring a key locks its entry in the requested
//! [`Mode`] and creates the entry on a miss, with a payload produced by the cache [`Hooks`]. When the charged cost
//! grows over the eviction threshold of the quota, the least recently used entries that nobody holds are evicted.
//!
//! ```
//! use lockcache::{Cache, Mode};
//!
//! let cache: Cache<u32> = Cache::builder(16 * 1024).with_entry_size(1024).build().unwrap();
//!
//! let mut handle = cache.acquire(42, Mode::Write).unwrap();
//! handle.value_mut().unwrap()[0] = 1;
//! let handle = handle.downgrade();
//! assert_eq!(handle[0], 1);
//! drop(handle);
//!
//! assert!(cache.contains(&42));
//! assert!(cache.remove(&42));
//! ```

/// Shared components of lockcache.
pub mod common {
    pub use lockcache_common::*;
}

/// The in-memory cache.
pub mod memory {
    pub use lockcache_memory::*;
}

mod prelude;
pub use prelude::*;
