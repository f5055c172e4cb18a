// Thin wrapper around tokio so every background task is spawned through a
// single place with a name attached for tracing.

pub use ::tokio::{select, sync, task, time};

use ::tokio::task::JoinHandle;
use log::trace;
use std::future::Future;

/// Spawn a named task on the current runtime
pub fn spawn_task<F, S>(name: S, future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
    S: Into<String>,
{
    let name = name.into();
    trace!("Spawning task: {}", name);
    ::tokio::task::spawn(future)
}
