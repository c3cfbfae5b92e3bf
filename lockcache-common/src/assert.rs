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

//! Invariant checks that are compiled in for debug builds, and for release builds with feature
//! `strict_assertions` enabled on the calling crate.

/// `assert!` in debug builds or with feature `strict_assertions`, no-op otherwise.
#[macro_export]
macro_rules! strict_assert {
    ($($arg:tt)*) => {
        if cfg!(any(debug_assertions, feature = "strict_assertions")) {
            assert!($($arg)*);
        }
    };
}

/// `assert_eq!` in debug builds or with feature `strict_assertions`, no-op otherwise.
#[macro_export]
macro_rules! strict_assert_eq {
    ($($arg:tt)*) => {
        if cfg!(any(debug_assertions, feature = "strict_assertions")) {
            assert_eq!($($arg)*);
        }
    };
}
