//! Client configuration for the page.

use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};
use tracing::{info, warn};
use xns_controller::ClientConfig;

/// JSON override of [`ClientConfig`]; missing fields keep their defaults.
pub const CONFIG_KEY: &str = "xns_config";

pub fn load() -> ClientConfig {
    match LocalStorage::get::<ClientConfig>(CONFIG_KEY) {
        Ok(config) => {
            info!("using configuration from localStorage");
            config
        }
        Err(StorageError::KeyNotFound(_)) => ClientConfig::default(),
        Err(err) => {
            warn!("ignoring unreadable {CONFIG_KEY}: {err}");
            ClientConfig::default()
        }
    }
}
