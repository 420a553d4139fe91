//! Error accumulation with document paths
//!
//! Validators report every problem they find, in document order, each
//! prefixed with the JSON path of the offending node. The sink keeps the
//! walker free of string plumbing.

use std::fmt::Write as _;

/// Accumulates path-prefixed validation messages.
#[derive(Debug, Default)]
pub(crate) struct ErrorSink {
    path: Vec<String>,
    errors: Vec<String>,
}

impl ErrorSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Run `walk` with `segment` appended to the current path.
    pub(crate) fn at<F>(&mut self, segment: impl Into<String>, walk: F)
    where
        F: FnOnce(&mut Self),
    {
        self.path.push(segment.into());
        walk(self);
        self.path.pop();
    }

    /// Record a problem at the current path.
    pub(crate) fn report(&mut self, message: impl AsRef<str>) {
        let mut line = String::new();
        if !self.path.is_empty() {
            let _ = write!(line, "{}: ", self.path.join("."));
        }
        line.push_str(message.as_ref());
        self.errors.push(line);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn into_errors(self) -> Vec<String> {
        self.errors
    }
}
