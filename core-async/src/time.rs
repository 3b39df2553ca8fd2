//! Time-related abstractions backed by `tokio::time`.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, timeout, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(10)).await;
//!     assert!(start.elapsed() >= Duration::from_millis(10));
//!
//!     let slow = timeout(Duration::from_millis(1), sleep(Duration::from_secs(1))).await;
//!     assert!(slow.is_err());
//! }
//! ```

pub use tokio::time::{
    error::Elapsed, interval, sleep, sleep_until, timeout, Interval, MissedTickBehavior, Sleep,
    Timeout,
};

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Returns the current time as milliseconds since UNIX_EPOCH.
///
/// Clocks set before the epoch report `0`.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
