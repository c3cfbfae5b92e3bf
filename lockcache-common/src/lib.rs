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

//! Shared components and utils for lockcache.

pub mod assert;
/// Bounded exponential backoff for lock retry loops.
pub mod backoff;
/// Traits for key and value of the cache.
pub mod code;
/// Error type for lockcache.
pub mod error;
/// Entry lifecycle event listener.
pub mod event;
/// Hasher utils.
pub mod hasher;
/// Metrics model and registries.
pub mod metrics;
/// A slab arena and an index-linked list built on it.
pub mod slab;
