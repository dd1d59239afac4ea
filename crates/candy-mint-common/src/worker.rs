//! Detached worker tasks
//!
//! The refresh worker outlives the call that starts it. Natively it runs on
//! the tokio runtime; in the browser it runs on the current local set, so
//! its future need not be `Send`.

use std::future::Future;

use tokio::task::JoinHandle;

/// Start `worker` in the background
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_worker<F>(worker: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(worker)
}

/// Start `worker` on the local set
#[cfg(target_arch = "wasm32")]
pub fn spawn_worker<F>(worker: F) -> JoinHandle<F::Output>
where
    F: Future + 'static,
    F::Output: 'static,
{
    tokio::task::spawn_local(worker)
}
