//! Offline track cache.
//!
//! Facade over the workspace crates so hosts can depend on a single package:
//! - [`playback`]: track controllers and the single-playback coordinator
//! - [`store`]: the persistent collection store
//! - [`runtime`]: configuration, theme, events and logging
//! - [`bridge`]: host bridge traits
//! - `desktop` (feature `desktop`, on by default): desktop bridge implementations

pub use bridge_traits as bridge;
pub use core_playback as playback;
pub use core_runtime as runtime;
pub use core_store as store;

#[cfg(feature = "desktop")]
pub use bridge_desktop as desktop;

pub use core_playback::{
    human_readable_time, DownloadOutcome, PlaybackCoordinator, PlaybackError, PlayerContext,
    TrackController, TrackInfo, TrackState, TrackView,
};
pub use core_runtime::{PersistencePolicy, PlayerConfig, Theme};
