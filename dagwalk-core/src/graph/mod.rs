//! Dependency Graph
//!
//! This module implements the graph the walkers execute over.
//!
//! # Overview
//!
//! The dependency graph is a directed graph where:
//!
//! - Vertices are units of work, identified by any hashable, printable value
//! - Edges are dependencies: an edge from A to B means A must finish before
//!   B starts
//!
//! Before a walk, callers establish that the graph is a valid DAG with
//! [`AcyclicGraph::validate`], and may drop redundant edges with
//! [`AcyclicGraph::transitive_reduction`].
//!
//! # Design Decisions
//!
//! 1. Vertices and edges live in insertion-ordered sets because:
//!    - Reports list cycles and roots in a stable order
//!    - Traversals are deterministic, which keeps tests simple
//!
//! 2. Adjacency is indexed in both directions so "what does v depend on" and
//!    "what depends on v" are both a single lookup.
//!
//! 3. Cycle detection uses petgraph's Tarjan strongly-connected components
//!    so every cycle is found in one pass, not just the first.

mod acyclic;
mod edge;
mod store;
mod tarjan;

pub use acyclic::AcyclicGraph;
pub use edge::{Edge, Vertex};
pub use store::{Graph, Set};
pub use tarjan::strongly_connected;
