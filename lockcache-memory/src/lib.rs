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

//! In-memory, lock-handing cache of lockcache.
//!
//! The cache keeps a key index and a recency list behind one short-held structural lock, and guards every payload
//! with its own reader-writer lock. Acquisitions hand out a [`Handle`] that keeps the entry locked until it is
//! dropped.

mod buffer;
mod cache;
mod error;
mod handle;
mod hooks;
mod index;
mod raw;
mod record;

pub mod prelude;
pub use prelude::*;
