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
    backtrace::{Backtrace, BacktraceStatus},
    fmt::{Debug, Display},
    sync::Arc,
};

use itertools::Itertools;

/// Kinds of lockcache errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The payload of a new entry could not be allocated.
    Allocation,
    /// The cache configuration is invalid.
    Config,
    /// Raised by user code, e.g. an allocation hook.
    External,
}

impl ErrorKind {
    /// Static description of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Allocation => "Allocation error",
            ErrorKind::Config => "Config error",
            ErrorKind::External => "External error",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct Inner {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
    source: Option<Arc<anyhow::Error>>,
    backtrace: Arc<Backtrace>,
}

/// The error returned by lockcache operations.
///
/// The error is a single pointer wide, so `Result<Handle>` stays small on the hot path. `Display` renders one line:
///
/// ```plain
/// Allocation error, context: { size: 1024, align: 16, key: 42 } => payload allocation failed, source: ...
/// ```
///
/// `Debug` appends the backtrace when one was captured (see `RUST_BACKTRACE`). `{:#?}` prints the raw fields.
#[derive(Clone)]
pub struct Error {
    inner: Box<Inner>,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = &self.inner;
        write!(f, "{}", inner.kind)?;
        if !inner.context.is_empty() {
            let context = inner.context.iter().map(|(k, v)| format!("{k}: {v}")).join(", ");
            write!(f, ", context: {{ {context} }}")?;
        }
        if !inner.message.is_empty() {
            write!(f, " => {}", inner.message)?;
        }
        if let Some(source) = &inner.source {
            write!(f, ", source: {source}")?;
        }
        Ok(())
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            return f.debug_struct("Error").field("inner", &self.inner).finish();
        }
        Display::fmt(self, f)?;
        if self.inner.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\n\nBacktrace:\n{}", self.inner.backtrace)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner
            .source
            .as_deref()
            .map(|e| -> &(dyn std::error::Error + 'static) { e.as_ref() })
    }
}

impl Error {
    /// Create an error of `kind`.
    ///
    /// ```rust
    /// # use lockcache_common::error::{Error, ErrorKind};
    /// let reason = std::io::Error::other("pool exhausted");
    /// let e = Error::new(ErrorKind::Allocation, "payload allocation failed").with_source(reason);
    /// assert_eq!(e.kind(), ErrorKind::Allocation);
    /// ```
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            inner: Box::new(Inner {
                kind,
                message: message.into(),
                context: vec![],
                source: None,
                backtrace: Arc::new(Backtrace::capture()),
            }),
        }
    }

    /// Attach a key-value pair describing the failed operation.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.inner.context.push((key, value.to_string()));
        self
    }

    /// Attach the underlying error. Replaces a previously attached one.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.inner.source = Some(Arc::new(source.into()));
        self
    }

    /// Kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    /// Message of the error. May be empty.
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Attached context, in the order it was attached.
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.inner.context
    }

    /// Backtrace captured at creation.
    pub fn backtrace(&self) -> &Backtrace {
        &self.inner.backtrace
    }

    /// The underlying error, if any.
    pub fn source(&self) -> Option<&anyhow::Error> {
        self.inner.source.as_deref()
    }

    /// Downcast the underlying error.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source().and_then(|e| e.downcast_ref::<E>())
    }

    /// Failed to allocate a payload of `size` bytes aligned to `align`.
    pub fn allocation(size: usize, align: usize) -> Self {
        Error::new(ErrorKind::Allocation, "payload allocation failed")
            .with_context("size", size)
            .with_context("align", align)
    }

    /// Invalid configuration.
    pub fn config(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::Config, message)
    }

    /// Wrap an error raised by user code.
    pub fn external(source: impl Into<anyhow::Error>) -> Self {
        Error::new(ErrorKind::External, "").with_source(source)
    }
}

/// Result type for lockcache.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct PoolError(&'static str);

    impl Display for PoolError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "pool error: {}", self.0)
        }
    }

    impl std::error::Error for PoolError {}

    #[test]
    fn test_error_is_thin() {
        fn is_send_sync_static<T: Send + Sync + 'static>() {}
        is_send_sync_static::<Error>();
        assert_eq!(std::mem::size_of::<Error>(), std::mem::size_of::<usize>());
    }

    #[test]
    fn test_error_display() {
        let e = Error::allocation(1024, 16)
            .with_context("key", 42)
            .with_source(PoolError("exhausted"));
        assert_eq!(
            e.to_string(),
            "Allocation error, context: { size: 1024, align: 16, key: 42 } => payload allocation failed, source: pool error: exhausted"
        );

        assert_eq!(Error::config("bad quota").to_string(), "Config error => bad quota");
        assert!(format!("{e:?}").starts_with(&e.to_string()));
    }

    #[test]
    fn test_error_source() {
        let e = Error::external(PoolError("closed"));
        assert_eq!(e.kind(), ErrorKind::External);
        assert!(e.message().is_empty());
        assert_eq!(e.downcast_ref::<PoolError>(), Some(&PoolError("closed")));
        assert!(std::error::Error::source(&e).is_some());

        let cloned = e.clone();
        assert_eq!(cloned.to_string(), e.to_string());
        assert!(Error::config("x").downcast_ref::<PoolError>().is_none());
    }
}
