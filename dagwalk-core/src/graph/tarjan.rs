//! Strongly-Connected Components
//!
//! Cycle detection runs petgraph's Tarjan search over an index graph that
//! mirrors the store. Node `i` of the index graph is the vertex at insertion
//! position `i`, so results map straight back to vertices.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::edge::Vertex;
use super::store::Graph;

/// Return every strongly-connected component of `graph`.
///
/// Singleton components are included; a component with more than one vertex
/// is a cycle. Vertices inside a component are listed in insertion order, and
/// components are ordered by their earliest vertex.
pub fn strongly_connected<V: Vertex>(graph: &Graph<V>) -> Vec<Vec<V>> {
    let vertices = graph.vertices();

    let mut index: DiGraph<(), ()> = DiGraph::with_capacity(vertices.len(), graph.edge_count());
    for _ in vertices {
        index.add_node(());
    }
    for edge in graph.edges() {
        if let (Some(source), Some(target)) = (
            vertices.get_index_of(edge.source()),
            vertices.get_index_of(edge.target()),
        ) {
            index.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
        }
    }

    let mut components: Vec<Vec<usize>> = tarjan_scc(&index)
        .into_iter()
        .map(|component| {
            let mut positions: Vec<usize> = component.into_iter().map(NodeIndex::index).collect();
            positions.sort_unstable();
            positions
        })
        .collect();
    components.sort_unstable_by_key(|positions| positions.first().copied());

    components
        .into_iter()
        .map(|positions| {
            positions
                .into_iter()
                .filter_map(|position| vertices.get_index(position).cloned())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;

    fn cycles(graph: &Graph<&'static str>) -> Vec<Vec<&'static str>> {
        strongly_connected(graph)
            .into_iter()
            .filter(|c| c.len() > 1)
            .collect()
    }

    #[test]
    fn acyclic_graph_has_only_singletons() {
        let graph = Graph::from_parts(
            ["a", "b", "c"],
            [Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("a", "c")],
        );
        let components = strongly_connected(&graph);
        assert_eq!(components, vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn cycle_members_follow_insertion_order() {
        let graph = Graph::from_parts(
            ["a", "b", "c", "d"],
            [
                Edge::new("a", "b"),
                Edge::new("b", "c"),
                Edge::new("c", "d"),
                Edge::new("d", "b"),
            ],
        );
        assert_eq!(cycles(&graph), vec![vec!["b", "c", "d"]]);
    }

    #[test]
    fn cycle_order_ignores_edge_direction() {
        // The search enters the cycle at "d" but the report starts at "b"
        let graph = Graph::from_parts(
            ["b", "c", "d"],
            [Edge::new("d", "c"), Edge::new("c", "b"), Edge::new("b", "d")],
        );
        assert_eq!(cycles(&graph), vec![vec!["b", "c", "d"]]);
    }

    #[test]
    fn finds_independent_cycles() {
        let graph = Graph::from_parts(
            ["a", "b", "c", "d", "e"],
            [
                Edge::new("a", "b"),
                Edge::new("b", "a"),
                Edge::new("c", "d"),
                Edge::new("d", "c"),
                Edge::new("d", "e"),
            ],
        );
        assert_eq!(cycles(&graph), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn chain_has_one_component_per_vertex() {
        let n = 1_000;
        let graph = Graph::from_parts(0..n, (1..n).map(|i| Edge::new(i - 1, i)));
        let components = strongly_connected(&graph);
        assert_eq!(components.len(), n);
        assert_eq!(components[0], vec![0]);
    }
}
