//! Callback plumbing shared by both walkers.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::error::{BoxError, WalkError};
use crate::graph::Vertex;

/// Type-erased per-vertex callback.
pub(crate) type WalkFn<V> =
    Arc<dyn Fn(V) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Box a caller's callback so walkers can store and share it.
pub(crate) fn erase<V, F, Fut, E>(callback: F) -> WalkFn<V>
where
    V: Vertex,
    F: Fn(V) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    Arc::new(move |vertex: V| -> BoxFuture<'static, Result<(), BoxError>> {
        let call = callback(vertex);
        async move { call.await.map_err(|err| -> BoxError { err.into() }) }.boxed()
    })
}

/// Run the callback for one vertex, turning failures and panics into a
/// [`WalkError`] tagged with the vertex name.
pub(crate) async fn invoke<V: Vertex>(callback: &WalkFn<V>, vertex: &V) -> Result<(), WalkError> {
    let call = AssertUnwindSafe(async { callback(vertex.clone()).await })
        .catch_unwind()
        .await;

    match call {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(WalkError::failed(vertex.to_string(), source)),
        Err(payload) => Err(WalkError::panicked(vertex.to_string(), panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
