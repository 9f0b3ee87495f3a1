//! Dagwalk Core
//!
//! This crate runs a unit of work once per vertex of a dependency graph,
//! running independent vertices concurrently and never starting a vertex
//! before its dependencies have finished.
//!
//! It provides:
//!
//! - A graph store with adjacency in both directions
//! - DAG checks: single root, cycles, self references
//! - Transitive reduction
//! - A one-shot concurrent walk over a fixed graph
//! - A dependency walker whose graph can change mid-walk
//!
//! # Architecture
//!
//! The crate is organized into a few modules:
//!
//! - `graph`: vertices, edges, the graph store and the DAG algorithms
//! - `walk`: the static walk, the dependency walker and their signals
//! - `error`: error kinds and the aggregate error type
//!
//! Walks run on the Tokio multi-threaded runtime.
//!
//! # Example
//!
//! ```rust,ignore
//! use dagwalk_core::graph::{AcyclicGraph, Edge, Graph};
//!
//! let mut graph: AcyclicGraph<&str> = Graph::from_parts(
//!     ["fetch", "build", "test"],
//!     [Edge::new("fetch", "build"), Edge::new("build", "test")],
//! )
//! .into();
//!
//! graph.validate()?;
//! graph.transitive_reduction();
//!
//! graph
//!     .walk(|step| async move {
//!         println!("running {step}");
//!         Ok::<(), BoxError>(())
//!     })
//!     .await?;
//! ```

pub mod error;
pub mod graph;
pub mod walk;

pub use error::{BoxError, GraphError, MultiError, WalkError};
pub use graph::{AcyclicGraph, Edge, Graph, Set, Vertex};
pub use walk::{DependencyWalker, UpstreamFailure, WalkerConfig};
