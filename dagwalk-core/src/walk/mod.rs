//! Graph Walks
//!
//! This module runs a caller-supplied callback once per vertex, in parallel
//! wherever the edges allow it.
//!
//! # Walkers
//!
//! ## Static walk
//!
//! [`AcyclicGraph::walk`](crate::graph::AcyclicGraph::walk) runs a single
//! pass over a fixed graph. Dependents of a failed vertex are skipped.
//!
//! ## Dependency walker
//!
//! [`DependencyWalker`] accepts graph updates while the walk is in flight.
//! New vertices start, removed vertices are cancelled, and new edges
//! re-wire the waiting vertex without losing its place. Whether dependents
//! of a failed vertex run is set by [`UpstreamFailure`].
//!
//! # Ordering
//!
//! A vertex's callback never starts before every dependency it is waiting
//! on has completed. Vertices with no path between them may run in any
//! order, including at the same time.

mod callback;
mod config;
mod dependency;
mod signal;
mod static_walk;

pub use config::{UpstreamFailure, WalkerConfig, DEFAULT_HEARTBEAT_MS};
pub use dependency::DependencyWalker;
pub use signal::{Latch, Outcome};
