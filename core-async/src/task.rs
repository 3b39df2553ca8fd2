//! Task spawning.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub use tokio::task::{spawn_blocking, yield_now, AbortHandle, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current runtime.
///
/// The returned `JoinHandle` may be awaited for the task's output or dropped
/// to detach the task.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
