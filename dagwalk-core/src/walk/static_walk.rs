//! Static Walk
//!
//! One pass over a fixed graph snapshot. Every vertex gets a task that waits
//! for its dependencies, then runs the callback unless one of them failed.

use std::future::Future;

use smallvec::SmallVec;
use tokio::task::JoinSet;
use tracing::{debug, error};

use super::callback::{erase, invoke};
use super::signal::{Latch, Outcome};
use crate::error::{BoxError, MultiError, WalkError};
use crate::graph::{AcyclicGraph, Vertex};

impl<V: Vertex> AcyclicGraph<V> {
    /// Walk the graph, calling `callback` once per vertex.
    ///
    /// Vertices run in parallel wherever the edges allow it; a vertex starts
    /// only after all of its dependencies have finished. If a dependency
    /// failed, or was itself skipped, the vertex's callback is skipped but
    /// the vertex still completes so the rest of the walk proceeds.
    ///
    /// Returns every callback failure, in completion order.
    pub async fn walk<F, Fut, E>(&self, callback: F) -> Result<(), MultiError<WalkError>>
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let callback = erase(callback);
        let vertices = self.vertices();
        debug!(vertices = vertices.len(), edges = self.edge_count(), "starting graph walk");

        // One completion latch per vertex, indexed by vertex position
        let done: Vec<Latch<Outcome>> = vertices.iter().map(|_| Latch::new()).collect();

        let mut tasks = JoinSet::new();
        for (position, vertex) in vertices.iter().enumerate() {
            let deps: SmallVec<[(V, Latch<Outcome>); 4]> = self
                .iter_up(vertex)
                .filter_map(|dep| {
                    let latch = done.get(vertices.get_index_of(dep)?)?;
                    Some((dep.clone(), latch.clone()))
                })
                .collect();
            let ours = done[position].clone();
            let callback = callback.clone();
            let vertex = vertex.clone();

            tasks.spawn(async move {
                let mut failed_dep = None;
                for (dep, latch) in &deps {
                    if latch.wait().await.is_failure() && failed_dep.is_none() {
                        failed_dep = Some(dep);
                    }
                }

                let (outcome, error) = match failed_dep {
                    Some(dep) => {
                        debug!(
                            vertex = %vertex,
                            dependency = %dep,
                            "skipping vertex, dependency failed"
                        );
                        (Outcome::Skipped, None)
                    }
                    None => match invoke(&callback, &vertex).await {
                        Ok(()) => (Outcome::Succeeded, None),
                        Err(err) => (Outcome::Failed, Some(err)),
                    },
                };

                ours.fire(outcome);
                error
            });
        }

        let mut errors = MultiError::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(err)) => errors.push(err),
                Ok(None) => {}
                Err(err) => error!(error = %err, "walk task aborted"),
            }
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::graph::{Edge, Graph};

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

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn runs_every_vertex_once_without_edges() {
        let graph = dag(&["a", "b", "c", "d"], &[]);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        let result = graph
            .walk(move |v| {
                let log = log.clone();
                async move {
                    log.lock().push(v);
                    Ok::<(), BoxError>(())
                }
            })
            .await;

        assert!(result.is_ok());
        let mut seen = seen.lock().clone();
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn failure_skips_dependents() {
        let graph = dag(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d")]);
        let ran = Arc::new(Mutex::new(Vec::new()));

        let log = ran.clone();
        let errors = graph
            .walk(move |v| {
                let log = log.clone();
                async move {
                    log.lock().push(v);
                    if v == "b" {
                        Err("b broke")
                    } else {
                        Ok(())
                    }
                }
            })
            .await
            .unwrap_err();

        assert_eq!(*ran.lock(), vec!["a", "b"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].vertex(), "b");
    }

    #[tokio::test]
    async fn empty_graph_walks_cleanly() {
        let graph: AcyclicGraph<u32> = AcyclicGraph::new();
        let result = graph.walk(|_| async { Ok::<(), BoxError>(()) }).await;
        assert!(result.is_ok());
    }
}
