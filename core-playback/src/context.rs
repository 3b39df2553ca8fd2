use bridge_traits::{ConfirmationPrompt, DownloaderFactory};
use core_runtime::{EventBus, PlayerConfig};
use core_store::{StoreConfig, StoreRegistry};
use std::sync::Arc;

/// Collaborators shared by every track controller of one player.
///
/// Cloning is cheap; all fields are reference counted. Controllers built
/// from the same context share the store handle, the event bus and the
/// injected configuration.
#[derive(Clone)]
pub struct PlayerContext {
    pub config: Arc<PlayerConfig>,
    pub stores: Arc<StoreRegistry>,
    pub downloaders: Arc<dyn DownloaderFactory>,
    pub prompt: Arc<dyn ConfirmationPrompt>,
    pub events: EventBus,
}

impl PlayerContext {
    /// Builds a context whose store lives where `config.store_dir` says.
    pub fn new(
        config: PlayerConfig,
        downloaders: Arc<dyn DownloaderFactory>,
        prompt: Arc<dyn ConfirmationPrompt>,
    ) -> Self {
        let stores = StoreRegistry::new(StoreConfig::from_dir(config.store_dir.as_deref()));
        Self::with_registry(config, Arc::new(stores), downloaders, prompt)
    }

    /// Builds a context around an existing registry, e.g. to share one store
    /// between several players.
    pub fn with_registry(
        config: PlayerConfig,
        stores: Arc<StoreRegistry>,
        downloaders: Arc<dyn DownloaderFactory>,
        prompt: Arc<dyn ConfirmationPrompt>,
    ) -> Self {
        let events = EventBus::new(config.event_capacity.max(1));
        Self {
            config: Arc::new(config),
            stores,
            downloaders,
            prompt,
            events,
        }
    }
}

impl std::fmt::Debug for PlayerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerContext")
            .field("config", &self.config)
            .field("stores", &self.stores)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
