//! Error Types
//!
//! Graph validation and graph walks both report problems as data. Neither
//! stops at the first failure: validation collects every cycle and self
//! reference, and a walk collects every failed callback. Both hand back a
//! [`MultiError`] holding all of them.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Boxed error returned by walk callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Structural problems found in a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GraphError {
    /// More than one vertex has no incoming edge.
    #[error("multiple roots: {}", .0.join(", "))]
    MultipleRoots(Vec<String>),

    /// Every vertex has at least one incoming edge.
    #[error("no roots found")]
    NoRoot,

    /// A strongly-connected component with more than one vertex.
    /// Vertices are listed in insertion order.
    #[error("cycle: {}", .0.join(", "))]
    CycleDetected(Vec<String>),

    /// An edge whose source and target are the same vertex.
    #[error("self reference: {0}")]
    SelfReference(String),
}

/// A vertex callback that did not complete successfully.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum WalkError {
    /// The callback returned an error.
    #[error("{vertex}: {source}")]
    CallbackFailed {
        /// Name of the vertex whose callback failed.
        vertex: String,
        /// The error the callback returned.
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The callback panicked.
    #[error("{vertex}: callback panicked: {message}")]
    CallbackPanicked {
        /// Name of the vertex whose callback panicked.
        vertex: String,
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl WalkError {
    /// Creates a callback failure for the named vertex.
    pub fn failed(vertex: impl Into<String>, source: BoxError) -> Self {
        Self::CallbackFailed {
            vertex: vertex.into(),
            source: Arc::from(source),
        }
    }

    /// Creates a callback panic report for the named vertex.
    pub fn panicked(vertex: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallbackPanicked {
            vertex: vertex.into(),
            message: message.into(),
        }
    }

    /// Name of the vertex this error belongs to.
    pub fn vertex(&self) -> &str {
        match self {
            Self::CallbackFailed { vertex, .. } | Self::CallbackPanicked { vertex, .. } => vertex,
        }
    }
}

/// An ordered collection of independent errors reported as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiError<E> {
    errors: Vec<E>,
}

impl<E> MultiError<E> {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Append an error.
    pub fn push(&mut self, error: E) {
        self.errors.push(error);
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the collected errors in the order they were added.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.errors.iter()
    }

    /// Borrow the collected errors.
    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// Take the collected errors.
    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<E> Default for MultiError<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> From<E> for MultiError<E> {
    fn from(error: E) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl<E> FromIterator<E> for MultiError<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl<E> Extend<E> for MultiError<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl<E> IntoIterator for MultiError<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a MultiError<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl<E: fmt::Display> fmt::Display for MultiError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            1 => writeln!(f, "1 error occurred:")?,
            n => writeln!(f, "{n} errors occurred:")?,
        }
        for error in &self.errors {
            writeln!(f, "\t* {error}")?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for MultiError<E> {}
