//! Async abstraction layer for the offline track cache.
//!
//! Every `core-*` and `bridge-*` crate depends on this crate rather than on
//! tokio directly, so the executor can be swapped in one place.
//!
//! # Modules
//!
//! - `task`: task spawning
//! - `time`: sleep, timeout, interval and instants
//! - `sync`: async-aware locks, channels and cancellation
//! - `runtime`: blocking entry point used by the attribute macros
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let token = CancellationToken::new();
//!     let child = token.clone();
//!
//!     let handle = core_async::spawn(async move {
//!         core_async::select! {
//!             _ = child.cancelled() => None,
//!             _ = sleep(Duration::from_secs(5)) => Some(42),
//!         }
//!     });
//!
//!     token.cancel();
//!     assert_eq!(handle.await.unwrap(), None);
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
pub use tokio::select;
