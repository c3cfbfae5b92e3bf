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

use std::fmt::Display;

/// In-memory cache builder error.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Multiple error list.
    #[error(transparent)]
    Multiple(MultipleError),
    /// Config error.
    #[error("config error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Combine multiple errors into one error.
    pub fn multiple(errs: Vec<Error>) -> Self {
        Self::Multiple(MultipleError(errs))
    }

    /// Create a config error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigError(reason.into())
    }
}

/// A list of errors reported together.
#[derive(thiserror::Error, Debug)]
pub struct MultipleError(Vec<Error>);

impl MultipleError {
    /// The reported errors.
    pub fn errors(&self) -> &[Error] {
        &self.0
    }
}

impl Display for MultipleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "multiple errors: [")?;
        if let Some((last, errs)) = self.0.as_slice().split_last() {
            for err in errs {
                write!(f, "{}, ", err)?;
            }
            write!(f, "{}", last)?;
        }
        write!(f, "]")?;
        Ok(())
    }
}

impl From<Error> for lockcache_common::error::Error {
    fn from(e: Error) -> Self {
        lockcache_common::error::Error::config(e.to_string())
    }
}

/// In-memory cache builder result.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use lockcache_common::error::ErrorKind;

    use super::*;

    #[test]
    fn test_multiple_error_display() {
        let e = Error::multiple(vec![Error::config("entry size is zero"), Error::config("bad threshold")]);
        assert_eq!(
            e.to_string(),
            "multiple errors: [config error: entry size is zero, config error: bad threshold]"
        );

        let e: lockcache_common::error::Error = e.into();
        assert_eq!(e.kind(), ErrorKind::Config);
        assert!(e.message().contains("bad threshold"));
    }
}
