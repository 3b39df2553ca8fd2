//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the offline track cache crates:
//! - Logging and tracing bootstrap
//! - Player configuration and the injected theme
//! - Event bus for observers of track lifecycle
//!
//! Nothing here knows about tracks beyond their keys; the state machine lives
//! in `core-playback` and the store in `core-store`.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod theme;

pub use config::{PersistencePolicy, PlayerConfig, PlayerConfigBuilder};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, EventStream, TrackEvent};
pub use theme::{Palette, Spacing, Theme, TrackStyle};
