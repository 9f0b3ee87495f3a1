//! Vertices and Edges
//!
//! A vertex is any caller-defined value with equality, hashing and a
//! printable name. An edge is an ordered pair: the source must finish before
//! the target starts.

use std::fmt;
use std::hash::Hash;

/// A node in the dependency graph.
///
/// Implemented for every type that is cloneable, hashable, printable and
/// shareable across threads. The `Display` output is the vertex's name in
/// errors and log lines.
pub trait Vertex: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> Vertex for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{}

/// A dependency edge: `source` must complete before `target` begins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge<V> {
    source: V,
    target: V,
}

impl<V> Edge<V> {
    /// Create an edge from `source` (the dependency) to `target` (the dependent).
    pub fn new(source: V, target: V) -> Self {
        Self { source, target }
    }

    /// The dependency.
    pub fn source(&self) -> &V {
        &self.source
    }

    /// The dependent.
    pub fn target(&self) -> &V {
        &self.target
    }
}

impl<V: PartialEq> Edge<V> {
    /// True if the edge starts and ends at the same vertex.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl<V: fmt::Display> fmt::Display for Edge<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
