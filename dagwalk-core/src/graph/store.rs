//! Graph Store
//!
//! Vertex and edge membership plus adjacency queries in both directions.
//!
//! # Representation
//!
//! Vertices and edges are kept in insertion-ordered sets so every traversal,
//! report and log line comes out in a deterministic order. For each vertex we
//! keep two adjacency sets:
//!
//! - `up`: vertices with an edge *into* this vertex (its dependencies)
//! - `down`: vertices this vertex has an edge *to* (its dependents)
//!
//! Every edge endpoint is always a member of the vertex set. Removing a
//! vertex removes its incident edges with it.

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use super::edge::{Edge, Vertex};

/// Insertion-ordered set used for vertex and edge collections.
///
/// Set algebra (`union`, `difference`, `intersection`) comes from `IndexSet`.
pub type Set<T> = IndexSet<T>;

/// A directed graph with adjacency indexes in both directions.
#[derive(Debug, Clone)]
pub struct Graph<V: Vertex> {
    vertices: Set<V>,
    edges: Set<Edge<V>>,
    /// Vertex -> vertices it has edges to.
    down: IndexMap<V, Set<V>>,
    /// Vertex -> vertices that have edges to it.
    up: IndexMap<V, Set<V>>,
}

impl<V: Vertex> Graph<V> {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            vertices: Set::new(),
            edges: Set::new(),
            down: IndexMap::new(),
            up: IndexMap::new(),
        }
    }

    /// Build a graph from vertex and edge lists.
    ///
    /// Edges whose endpoints are not listed are skipped.
    pub fn from_parts(
        vertices: impl IntoIterator<Item = V>,
        edges: impl IntoIterator<Item = Edge<V>>,
    ) -> Self {
        let mut graph = Self::new();
        for vertex in vertices {
            graph.add(vertex);
        }
        for edge in edges {
            graph.connect(edge);
        }
        graph
    }

    /// Add a vertex. Returns `false` if it was already present.
    pub fn add(&mut self, vertex: V) -> bool {
        if !self.vertices.insert(vertex.clone()) {
            return false;
        }
        self.down.insert(vertex.clone(), Set::new());
        self.up.insert(vertex, Set::new());
        true
    }

    /// Remove a vertex.
    ///
    /// Also removes all edges involving this vertex.
    pub fn remove(&mut self, vertex: &V) -> bool {
        if !self.vertices.shift_remove(vertex) {
            return false;
        }

        // Unhook from the dependents' dependency lists
        if let Some(dependents) = self.down.shift_remove(vertex) {
            for target in &dependents {
                if let Some(up) = self.up.get_mut(target) {
                    up.shift_remove(vertex);
                }
                self.edges
                    .shift_remove(&Edge::new(vertex.clone(), target.clone()));
            }
        }

        // Unhook from the dependencies' dependent lists
        if let Some(dependencies) = self.up.shift_remove(vertex) {
            for source in &dependencies {
                if let Some(down) = self.down.get_mut(source) {
                    down.shift_remove(vertex);
                }
                self.edges
                    .shift_remove(&Edge::new(source.clone(), vertex.clone()));
            }
        }

        true
    }

    /// Check whether a vertex is a member.
    pub fn contains(&self, vertex: &V) -> bool {
        self.vertices.contains(vertex)
    }

    /// Add an edge.
    ///
    /// Returns `false` if the edge already exists or if either endpoint is
    /// not a member, in which case nothing changes.
    pub fn connect(&mut self, edge: Edge<V>) -> bool {
        if !self.contains(edge.source()) || !self.contains(edge.target()) {
            return false;
        }
        if !self.edges.insert(edge.clone()) {
            return false;
        }
        if let Some(down) = self.down.get_mut(edge.source()) {
            down.insert(edge.target().clone());
        }
        if let Some(up) = self.up.get_mut(edge.target()) {
            up.insert(edge.source().clone());
        }
        true
    }

    /// Remove an edge. Returns `false` if it was not present.
    pub fn remove_edge(&mut self, edge: &Edge<V>) -> bool {
        if !self.edges.shift_remove(edge) {
            return false;
        }
        if let Some(down) = self.down.get_mut(edge.source()) {
            down.shift_remove(edge.target());
        }
        if let Some(up) = self.up.get_mut(edge.target()) {
            up.shift_remove(edge.source());
        }
        true
    }

    /// Check whether an edge is present.
    pub fn has_edge(&self, edge: &Edge<V>) -> bool {
        self.edges.contains(edge)
    }

    /// All vertices, in insertion order.
    pub fn vertices(&self) -> &Set<V> {
        &self.vertices
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> &Set<Edge<V>> {
        &self.edges
    }

    /// Vertices with an edge into `vertex` (the things it depends on).
    pub fn up_adjacency(&self, vertex: &V) -> Set<V> {
        self.up.get(vertex).cloned().unwrap_or_default()
    }

    /// Vertices that `vertex` has an edge to (the things depending on it).
    pub fn down_adjacency(&self, vertex: &V) -> Set<V> {
        self.down.get(vertex).cloned().unwrap_or_default()
    }

    /// Iterate over the up-adjacency of `vertex` without copying it.
    pub fn iter_up<'a>(&'a self, vertex: &V) -> impl DoubleEndedIterator<Item = &'a V> + 'a {
        self.up.get(vertex).into_iter().flatten()
    }

    /// Iterate over the down-adjacency of `vertex` without copying it.
    pub fn iter_down<'a>(&'a self, vertex: &V) -> impl DoubleEndedIterator<Item = &'a V> + 'a {
        self.down.get(vertex).into_iter().flatten()
    }

    /// Number of edges ending at `vertex`.
    pub fn in_degree(&self, vertex: &V) -> usize {
        self.up.get(vertex).map_or(0, |up| up.len())
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl<V: Vertex> Default for Graph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Vertex> fmt::Display for Graph<V> {
    /// One line per vertex followed by its dependents, indented.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for vertex in &self.vertices {
            writeln!(f, "{vertex}")?;
            for target in self.iter_down(vertex) {
                writeln!(f, "  {target}")?;
            }
        }
        Ok(())
    }
}
