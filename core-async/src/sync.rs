//! Synchronization primitives.
//!
//! Async-aware locks and channels come from `tokio::sync`; they are `Send +
//! Sync` and never block the executor while waiting. Cancellation tokens come
//! from `tokio_util::sync` and are used to abort in-flight downloads.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{broadcast, CancellationToken};
//!
//! async fn example() {
//!     let (tx, mut rx) = broadcast::channel::<u32>(8);
//!     tx.send(7).unwrap();
//!     assert_eq!(rx.recv().await.unwrap(), 7);
//!
//!     let parent = CancellationToken::new();
//!     let child = parent.child_token();
//!     parent.cancel();
//!     assert!(child.is_cancelled());
//! }
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard, Semaphore, SemaphorePermit,
};

pub use tokio_util::sync::{CancellationToken, DropGuard, WaitForCancellationFuture};
