//! Acyclic Graph
//!
//! A [`Graph`] that is expected to stay free of cycles. The algorithms here
//! establish the preconditions the walkers rely on: a single root, no cycles,
//! no self references.

use std::collections::HashSet;
use std::convert::Infallible;
use std::ops::{Deref, DerefMut};

use super::edge::{Edge, Vertex};
use super::store::Graph;
use super::tarjan::strongly_connected;
use crate::error::{GraphError, MultiError};

/// A directed graph with the DAG algorithms on top.
///
/// Dereferences to the underlying [`Graph`] for membership and adjacency.
#[derive(Debug, Clone)]
pub struct AcyclicGraph<V: Vertex> {
    graph: Graph<V>,
}

impl<V: Vertex> AcyclicGraph<V> {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
        }
    }

    /// Take back the underlying graph.
    pub fn into_inner(self) -> Graph<V> {
        self.graph
    }

    /// Return the single vertex with no incoming edge.
    ///
    /// Complexity: O(V)
    pub fn root(&self) -> Result<V, GraphError> {
        let roots: Vec<&V> = self
            .graph
            .vertices()
            .iter()
            .filter(|v| self.graph.in_degree(v) == 0)
            .collect();

        match roots.as_slice() {
            [] => Err(GraphError::NoRoot),
            [root] => Ok((*root).clone()),
            many => Err(GraphError::MultipleRoots(
                many.iter().map(|v| v.to_string()).collect(),
            )),
        }
    }

    /// Check that the graph has exactly one root, no cycles and no self
    /// references.
    ///
    /// Every violation is reported, not just the first one found.
    pub fn validate(&self) -> Result<(), MultiError<GraphError>> {
        let mut errors = MultiError::new();

        if let Err(err) = self.root() {
            errors.push(err);
        }

        // Cycles of more than one vertex
        for component in strongly_connected(&self.graph) {
            if component.len() > 1 {
                errors.push(GraphError::CycleDetected(
                    component.iter().map(|v| v.to_string()).collect(),
                ));
            }
        }

        // Cycles to self
        for edge in self.graph.edges() {
            if edge.is_self_loop() {
                errors.push(GraphError::SelfReference(edge.source().to_string()));
            }
        }

        errors.into_result()
    }

    /// Remove every edge that is implied by a longer path.
    ///
    /// If `a -> b`, `b -> c` and `a -> c` all exist, `a -> c` is removed.
    /// Reachability between every pair of vertices is unchanged.
    ///
    /// The graph must pass [`validate`](Self::validate) first; on a cyclic
    /// or multi-rooted graph the result is unspecified.
    ///
    /// Complexity: O(V(V+E))
    pub fn transitive_reduction(&mut self) {
        let vertices: Vec<V> = self.graph.vertices().iter().cloned().collect();

        for u in &vertices {
            let targets = self.graph.down_adjacency(u);
            let start: Vec<V> = targets.iter().cloned().collect();

            // Anything reachable from a direct target that u also points at
            // directly is redundant.
            let mut redundant = Vec::new();
            let walked = self.depth_first_walk(&start, |v| {
                for shared in targets.intersection(&self.graph.down_adjacency(v)) {
                    redundant.push(Edge::new(u.clone(), shared.clone()));
                }
                Ok::<(), Infallible>(())
            });
            match walked {
                Ok(()) => {}
                Err(never) => match never {},
            }

            for edge in &redundant {
                self.graph.remove_edge(edge);
            }
        }
    }

    /// Depth-first walk from the vertices in `start`, following down edges.
    ///
    /// Each reachable vertex is visited once, the start vertices included.
    /// Children are visited in adjacency order. The walk stops at the first
    /// error returned by `visit`.
    pub fn depth_first_walk<F, E>(&self, start: &[V], mut visit: F) -> Result<(), E>
    where
        F: FnMut(&V) -> Result<(), E>,
    {
        let mut seen: HashSet<V> = HashSet::new();
        let mut frontier: Vec<V> = start.to_vec();

        while let Some(current) = frontier.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }

            visit(&current)?;

            // Pushed in reverse so they pop in order
            frontier.extend(self.graph.iter_down(&current).rev().cloned());
        }

        Ok(())
    }
}

impl<V: Vertex> Default for AcyclicGraph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Vertex> From<Graph<V>> for AcyclicGraph<V> {
    fn from(graph: Graph<V>) -> Self {
        Self { graph }
    }
}

impl<V: Vertex> Deref for AcyclicGraph<V> {
    type Target = Graph<V>;

    fn deref(&self) -> &Graph<V> {
        &self.graph
    }
}

impl<V: Vertex> DerefMut for AcyclicGraph<V> {
    fn deref_mut(&mut self) -> &mut Graph<V> {
        &mut self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dag(
        vertices: &[&'static str],
        edges: &[(&'static str, &'static str)],
    ) -> AcyclicGraph<&'static str> {
        Graph::from_parts(
            vertices.iter().copied(),
            edges.iter().map(|&(s, t)| Edge::new(s, t)),
        )
        .into()
    }

    fn reachable(graph: &AcyclicGraph<&'static str>, from: &'static str) -> HashSet<&'static str> {
        let mut found = HashSet::new();
        let start: Vec<_> = graph.iter_down(&from).copied().collect();
        let _ = graph.depth_first_walk(&start, |v| {
            found.insert(*v);
            Ok::<(), Infallible>(())
        });
        found
    }

    #[test]
    fn root_finds_single_root() {
        let graph = dag(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        assert_eq!(graph.root(), Ok("a"));
    }

    #[test]
    fn root_rejects_multiple_roots() {
        let graph = dag(&["a", "b", "c"], &[("a", "c")]);
        assert_eq!(
            graph.root(),
            Err(GraphError::MultipleRoots(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn root_rejects_rootless_graph() {
        let graph = dag(&["a", "b"], &[("a", "b"), ("b", "a")]);
        assert_eq!(graph.root(), Err(GraphError::NoRoot));

        let empty: AcyclicGraph<&str> = AcyclicGraph::new();
        assert_eq!(empty.root(), Err(GraphError::NoRoot));
    }

    #[test]
    fn validate_accepts_dag() {
        let graph = dag(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("a", "c")]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn validate_reports_cycle() {
        let graph = dag(&["root", "a", "b"], &[("root", "a"), ("a", "b"), ("b", "a")]);
        let errors = graph.validate().unwrap_err();
        assert_eq!(
            errors.errors(),
            &[GraphError::CycleDetected(vec!["a".into(), "b".into()])]
        );
    }

    #[test]
    fn validate_reports_self_reference() {
        let graph = dag(&["root", "a"], &[("root", "a"), ("a", "a")]);
        let errors = graph.validate().unwrap_err();
        assert_eq!(errors.errors(), &[GraphError::SelfReference("a".into())]);
    }

    #[test]
    fn validate_reports_everything_at_once() {
        let graph = dag(
            &["root", "a", "b", "c", "d"],
            &[
                ("root", "a"),
                ("a", "b"),
                ("b", "a"),
                ("root", "c"),
                ("c", "d"),
                ("d", "c"),
                ("d", "d"),
            ],
        );
        let errors = graph.validate().unwrap_err();
        assert_eq!(
            errors.errors(),
            &[
                GraphError::CycleDetected(vec!["a".into(), "b".into()]),
                GraphError::CycleDetected(vec!["c".into(), "d".into()]),
                GraphError::SelfReference("d".into()),
            ]
        );

        // Same report on a second run
        assert_eq!(graph.validate().unwrap_err(), errors);
    }

    #[test]
    fn validate_includes_root_failure() {
        let graph = dag(&["a", "b", "c", "d"], &[("c", "d"), ("d", "c")]);
        let errors = graph.validate().unwrap_err();
        assert_eq!(
            errors.errors(),
            &[
                GraphError::MultipleRoots(vec!["a".into(), "b".into()]),
                GraphError::CycleDetected(vec!["c".into(), "d".into()]),
            ]
        );
    }

    #[test]
    fn transitive_reduction_removes_shortcut() {
        let mut graph = dag(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("a", "c")]);
        graph.transitive_reduction();

        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_edge(&Edge::new("a", "b")));
        assert!(graph.has_edge(&Edge::new("b", "c")));
        assert!(!graph.has_edge(&Edge::new("a", "c")));
    }

    #[test]
    fn transitive_reduction_keeps_diamond() {
        let mut graph = dag(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("a", "d")],
        );
        graph.transitive_reduction();

        assert_eq!(graph.edge_count(), 4);
        assert!(!graph.has_edge(&Edge::new("a", "d")));
    }

    #[test]
    fn transitive_reduction_is_idempotent_and_preserves_reachability() {
        let mut graph = dag(
            &["a", "b", "c", "d", "e"],
            &[
                ("a", "b"),
                ("a", "c"),
                ("a", "d"),
                ("a", "e"),
                ("b", "d"),
                ("c", "d"),
                ("d", "e"),
                ("b", "e"),
            ],
        );
        let before: Vec<_> = graph
            .vertices()
            .iter()
            .map(|v| (*v, reachable(&graph, v)))
            .collect();

        graph.transitive_reduction();
        let once = graph.edges().clone();
        graph.transitive_reduction();
        assert_eq!(graph.edges(), &once);

        for (v, reach) in before {
            assert_eq!(reachable(&graph, v), reach, "reachability changed for {v}");
        }
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn depth_first_walk_visits_once_in_order() {
        let graph = dag(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        let mut visited = Vec::new();
        let _ = graph.depth_first_walk(&["a"], |v| {
            visited.push(*v);
            Ok::<(), Infallible>(())
        });
        assert_eq!(visited, vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn depth_first_walk_stops_on_error() {
        let graph = dag(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let mut visited = Vec::new();
        let result = graph.depth_first_walk(&["a"], |v| {
            visited.push(*v);
            if *v == "b" {
                Err("stop")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(visited, vec!["a", "b"]);
    }
}
