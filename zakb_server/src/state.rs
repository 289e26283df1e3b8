use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use log::warn;
use tokio::sync::RwLock;
use zakb_core::{clearance::Clearance, config::Config, garbage_client::CollectionEvent};

/// The latest known collection per clearance, a missing entry means no collection is known.
pub type EventStore = BTreeMap<Clearance, CollectionEvent>;

#[derive(Debug, Clone)]
pub struct AppState {
    config_path: PathBuf,
    pub config: Arc<RwLock<Config>>,
    pub events: Arc<RwLock<EventStore>>,
}

impl AppState {
    pub fn new(config_path: PathBuf, config: Config) -> Self {
        Self {
            config_path,
            config: Arc::new(RwLock::new(config)),
            events: Arc::new(RwLock::new(EventStore::new())),
        }
    }

    /// Read the configuration file again, keeping the current configuration if that fails.
    pub async fn reload_config(&self) -> Config {
        match Config::load(&self.config_path) {
            Ok(config) => {
                *self.config.write().await = config.clone();
                config
            }
            Err(err) => {
                warn!(
                    "Keeping the current configuration, {} is unusable: {err}",
                    self.config_path.display()
                );
                self.config.read().await.clone()
            }
        }
    }

    /// Remember the latest result for a clearance.
    pub async fn store(&self, clearance: Clearance, event: Option<CollectionEvent>) {
        let mut events = self.events.write().await;
        match event {
            Some(event) => {
                events.insert(clearance, event);
            }
            None => {
                events.remove(&clearance);
            }
        }
    }
}
