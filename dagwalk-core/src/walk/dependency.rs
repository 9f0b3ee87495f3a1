//! Dependency Walker
//!
//! A walk whose vertex and edge sets can change while it is running.
//!
//! # How It Works
//!
//! 1. [`DependencyWalker::update`] reconciles the live registry against the
//!    full target graph. New vertices get a long-running task, removed
//!    vertices are cancelled, and new edges are recorded on the dependent.
//!
//! 2. Whenever a vertex's dependency set changes, a fresh watcher task is
//!    started over a snapshot of the dependencies. The previous watcher is
//!    retired through its own cancellation token.
//!
//! 3. The vertex task waits for a "satisfied" latch. Each latch carries a
//!    generation number, and the task only honours the latch of the current
//!    generation, so a superseded watcher can never release it.
//!
//! # Generation Gate
//!
//! Each vertex has a small gate holding the current generation and whether
//! the task has committed to running. A rewire bumps the generation and
//! queues the new latch while holding the gate; the task commits only while
//! holding the gate. A dependency change that arrives after the commit is
//! ignored.
//!
//! # Locking
//!
//! The registry, the error map and the outstanding-work counter each have
//! their own lock, and none of them is held across an await point.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::callback::{erase, invoke, WalkFn};
use super::config::{UpstreamFailure, WalkerConfig};
use super::signal::{Latch, Outcome};
use crate::error::{BoxError, MultiError, WalkError};
use crate::graph::{Edge, Graph, Set, Vertex};

/// What a dependency watcher reports once every dependency has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Upstream {
    /// Nothing upstream failed.
    Clear,
    /// The named dependency failed or was skipped.
    Failed(String),
}

/// A "dependencies satisfied" latch tagged with its generation.
struct Satisfaction {
    generation: u64,
    ready: Latch<Upstream>,
}

#[derive(Debug, Default)]
struct Gate {
    generation: u64,
    started: bool,
}

/// State shared between the registry and a vertex's task.
struct VertexState {
    done: Latch<Outcome>,
    cancel: CancellationToken,
    gate: Mutex<Gate>,
}

/// Registry entry for one vertex. Only touched under the registry lock.
struct VertexEntry<V> {
    state: Arc<VertexState>,
    /// Dependency -> its completion latch.
    deps: IndexMap<V, Latch<Outcome>>,
    /// Retires the current dependency watcher.
    deps_cancel: Option<CancellationToken>,
    updates: mpsc::UnboundedSender<Satisfaction>,
}

struct Registry<V> {
    vertices: Set<V>,
    edges: Set<Edge<V>>,
    entries: IndexMap<V, VertexEntry<V>>,
}

/// Everything a running task needs from the walker.
struct Shared<V> {
    callback: WalkFn<V>,
    config: WalkerConfig,
    errors: Mutex<IndexMap<V, WalkError>>,
    outstanding: watch::Sender<usize>,
}

/// Walks a graph that may change underneath it.
///
/// Feed it the desired graph with [`update`](Self::update), as often as
/// needed, and collect the result with [`wait`](Self::wait).
///
/// # Example
///
/// ```rust,ignore
/// let walker = DependencyWalker::new(|step: String| async move {
///     println!("running {step}");
///     Ok::<(), BoxError>(())
/// });
///
/// walker.update_graph(&graph);
/// walker.wait().await?;
/// ```
pub struct DependencyWalker<V: Vertex> {
    shared: Arc<Shared<V>>,
    registry: Mutex<Registry<V>>,
}

impl<V: Vertex> DependencyWalker<V> {
    /// Create a walker with the default configuration.
    pub fn new<F, Fut, E>(callback: F) -> Self
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        Self::with_config(callback, WalkerConfig::default())
    }

    /// Create a walker with the given configuration.
    pub fn with_config<F, Fut, E>(callback: F, config: WalkerConfig) -> Self
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let (outstanding, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                callback: erase(callback),
                config,
                errors: Mutex::new(IndexMap::new()),
                outstanding,
            }),
            registry: Mutex::new(Registry {
                vertices: Set::new(),
                edges: Set::new(),
                entries: IndexMap::new(),
            }),
        }
    }

    /// The walker's configuration.
    pub fn config(&self) -> &WalkerConfig {
        &self.shared.config
    }

    /// Number of vertices whose task has not finished yet.
    pub fn outstanding(&self) -> usize {
        *self.shared.outstanding.borrow()
    }

    /// Reconcile the walk with the given graph.
    pub fn update_graph(&self, graph: &Graph<V>) {
        self.update(graph.vertices(), graph.edges());
    }

    /// Reconcile the walk with the full target vertex and edge sets.
    ///
    /// Vertices not seen before are started, vertices no longer listed are
    /// cancelled, and edges not seen before are added as dependencies. Edges
    /// between vertices that are still present are never removed. An edge with
    /// an endpoint that is not part of the walk is ignored until a later call
    /// lists both endpoints.
    ///
    /// Does not wait for any vertex to run. Must be called from within a
    /// Tokio runtime.
    pub fn update(&self, vertices: &Set<V>, edges: &Set<Edge<V>>) {
        let mut registry = self.registry.lock();

        let added: Vec<V> = vertices.difference(&registry.vertices).cloned().collect();
        let removed: Vec<V> = registry.vertices.difference(vertices).cloned().collect();
        let new_edges: Vec<Edge<V>> = edges.difference(&registry.edges).cloned().collect();
        registry.vertices = vertices.clone();
        // Remember only wired edges that are still listed between live vertices
        registry.edges.retain(|edge| {
            edges.contains(edge)
                && vertices.contains(edge.source())
                && vertices.contains(edge.target())
        });

        // Register new vertices. With no dependencies recorded yet they are
        // ready immediately.
        let mut starting = Vec::with_capacity(added.len());
        for vertex in added {
            self.shared.outstanding.send_modify(|n| *n += 1);

            let state = Arc::new(VertexState {
                done: Latch::new(),
                cancel: CancellationToken::new(),
                gate: Mutex::new(Gate::default()),
            });
            let (updates, rx) = mpsc::unbounded_channel();
            registry.entries.insert(
                vertex.clone(),
                VertexEntry {
                    state: Arc::clone(&state),
                    deps: IndexMap::new(),
                    deps_cancel: None,
                    updates,
                },
            );
            starting.push((vertex, state, rx));
        }

        // Cancel removed vertices. This also retires their watchers, which
        // hold child tokens.
        for vertex in &removed {
            if let Some(entry) = registry.entries.shift_remove(vertex) {
                debug!(vertex = %vertex, "cancelling removed vertex");
                entry.state.cancel.cancel();
            }
        }

        // Record new dependencies
        let mut changed: IndexSet<V> = IndexSet::new();
        for edge in &new_edges {
            if edge.is_self_loop() {
                warn!(edge = %edge, "ignoring self-referencing edge");
                continue;
            }
            let Some(dep_done) = registry
                .entries
                .get(edge.source())
                .map(|entry| entry.state.done.clone())
            else {
                trace!(edge = %edge, "ignoring edge from unknown vertex");
                continue;
            };
            let Some(waiter) = registry.entries.get_mut(edge.target()) else {
                trace!(edge = %edge, "ignoring edge to unknown vertex");
                continue;
            };
            // A re-added source brings a new completion latch
            let rewired = match waiter.deps.insert(edge.source().clone(), dep_done.clone()) {
                None => true,
                Some(previous) => !previous.same_as(&dep_done),
            };
            registry.edges.insert(edge.clone());
            if rewired {
                changed.insert(edge.target().clone());
            }
        }

        // Restart the dependency watchers of every vertex whose set changed
        for vertex in &changed {
            if let Some(entry) = registry.entries.get_mut(vertex) {
                self.rewire(vertex, entry);
            }
        }

        for (vertex, state, rx) in starting {
            tokio::spawn(walk_vertex(Arc::clone(&self.shared), vertex, state, rx));
        }
    }

    /// Hand a vertex a new "satisfied" latch backed by a fresh watcher.
    fn rewire(&self, vertex: &V, entry: &mut VertexEntry<V>) {
        let state = Arc::clone(&entry.state);
        let mut gate = state.gate.lock();
        if gate.started {
            debug!(vertex = %vertex, "vertex already running, dependency change ignored");
            return;
        }

        if let Some(previous) = entry.deps_cancel.take() {
            previous.cancel();
        }

        gate.generation += 1;
        let ready = Latch::new();
        let next = Satisfaction {
            generation: gate.generation,
            ready: ready.clone(),
        };
        if entry.updates.send(next).is_err() {
            // The task has already exited
            return;
        }

        let cancel = state.cancel.child_token();
        entry.deps_cancel = Some(cancel.clone());
        drop(gate);

        tokio::spawn(wait_deps(
            vertex.clone(),
            entry.deps.clone(),
            ready,
            cancel,
            self.shared.config.heartbeat(),
        ));
    }

    /// Wait for every registered vertex to finish and return the failures.
    ///
    /// Returns immediately if nothing is outstanding. Calling it again
    /// returns the same errors.
    pub async fn wait(&self) -> Result<(), MultiError<WalkError>> {
        let mut rx = self.shared.outstanding.subscribe();
        // The sender lives as long as `self`
        let _ = rx.wait_for(|n| *n == 0).await;

        let errors = self.shared.errors.lock();
        errors.values().cloned().collect::<MultiError<_>>().into_result()
    }
}

/// Long-running task for one vertex.
async fn walk_vertex<V: Vertex>(
    shared: Arc<Shared<V>>,
    vertex: V,
    state: Arc<VertexState>,
    mut updates: mpsc::UnboundedReceiver<Satisfaction>,
) {
    let outcome = match wait_ready(&state, &mut updates).await {
        None => {
            debug!(vertex = %vertex, "vertex cancelled before running");
            Outcome::Cancelled
        }
        Some(Upstream::Failed(dep)) if shared.config.upstream_failure == UpstreamFailure::Skip => {
            debug!(vertex = %vertex, dependency = %dep, "skipping vertex, dependency failed");
            Outcome::Skipped
        }
        Some(_) => match invoke(&shared.callback, &vertex).await {
            Ok(()) => Outcome::Succeeded,
            Err(err) => {
                shared.errors.lock().entry(vertex.clone()).or_insert(err);
                Outcome::Failed
            }
        },
    };

    state.done.fire(outcome);
    shared.outstanding.send_modify(|n| *n = n.saturating_sub(1));
}

/// Block until the current generation's dependencies are satisfied.
///
/// Returns `None` if the vertex is cancelled first.
async fn wait_ready(
    state: &VertexState,
    updates: &mut mpsc::UnboundedReceiver<Satisfaction>,
) -> Option<Upstream> {
    let mut current = Satisfaction {
        generation: 0,
        ready: Latch::fired(Upstream::Clear),
    };

    loop {
        tokio::select! {
            biased;

            _ = state.cancel.cancelled() => return None,

            Some(next) = updates.recv() => current = next,

            upstream = current.ready.wait() => {
                let mut gate = state.gate.lock();
                if gate.generation == current.generation {
                    gate.started = true;
                    return Some(upstream);
                }
                // Superseded; the replacement is already queued.
            }
        }
    }
}

/// Watch a snapshot of dependencies and fire `ready` once all have finished.
async fn wait_deps<V: Vertex>(
    vertex: V,
    deps: IndexMap<V, Latch<Outcome>>,
    ready: Latch<Upstream>,
    cancel: CancellationToken,
    heartbeat: Option<Duration>,
) {
    let mut upstream = Upstream::Clear;

    for (dep, done) in &deps {
        let outcome = loop {
            let tick = async {
                match heartbeat {
                    Some(interval) => tokio::time::sleep(interval).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;

                _ = cancel.cancelled() => return,

                outcome = done.wait() => break outcome,

                _ = tick => {
                    debug!(
                        vertex = %vertex,
                        waiting_for = %dep,
                        "vertex still waiting on dependency"
                    );
                }
            }
        };

        if outcome.is_failure() && upstream == Upstream::Clear {
            upstream = Upstream::Failed(dep.to_string());
        }
    }

    ready.fire(upstream);
}
