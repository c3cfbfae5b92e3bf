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

use std::{
    alloc::Layout,
    fmt::Debug,
    ops::{Deref, DerefMut},
    ptr::NonNull,
};

use allocator_api2::{
    alloc::{AllocError, Allocator, Global},
    vec::Vec as VecA,
};
use lockcache_common::error::{Error, Result};

/// Alignment of the payloads produced by the default allocator.
pub const PAYLOAD_ALIGN: usize = 16;

/// An allocator that raises the alignment of every layout to at least `N` bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignedAllocator<const N: usize>;

impl<const N: usize> AlignedAllocator<N> {
    const ALIGN: usize = {
        assert!(N.is_power_of_two());
        N
    };

    fn layout(layout: Layout) -> std::result::Result<Layout, AllocError> {
        Layout::from_size_align(layout.size(), layout.align().max(Self::ALIGN)).map_err(|_| AllocError)
    }
}

unsafe impl<const N: usize> Allocator for AlignedAllocator<N> {
    fn allocate(&self, layout: Layout) -> std::result::Result<NonNull<[u8]>, AllocError> {
        Global.allocate(Self::layout(layout)?)
    }

    fn allocate_zeroed(&self, layout: Layout) -> std::result::Result<NonNull<[u8]>, AllocError> {
        Global.allocate_zeroed(Self::layout(layout)?)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // The layout was accepted by `allocate`, so it is still valid here.
        if let Ok(layout) = Self::layout(layout) {
            Global.deallocate(ptr, layout)
        }
    }
}

/// A fixed-size, zero-filled byte buffer aligned to [`PAYLOAD_ALIGN`].
///
/// This is the payload type of caches built without custom hooks. The memory is freed on drop.
pub struct AlignedBuffer {
    data: VecA<u8, AlignedAllocator<PAYLOAD_ALIGN>>,
}

impl Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer").field("len", &self.data.len()).finish()
    }
}

impl AlignedBuffer {
    /// Allocate a zero-filled buffer of `size` bytes.
    ///
    /// Returns an [`ErrorKind::Allocation`](lockcache_common::error::ErrorKind::Allocation) error if the memory
    /// cannot be reserved.
    pub fn new(size: usize) -> Result<Self> {
        let mut data = VecA::new_in(AlignedAllocator::<PAYLOAD_ALIGN>);
        data.try_reserve_exact(size)
            .map_err(|_| Error::allocation(size, PAYLOAD_ALIGN))?;
        data.resize(size, 0);
        Ok(Self { data })
    }
}

impl Deref for AlignedBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}
