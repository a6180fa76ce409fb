//! Application state shared by every handler.

use audiodrop_core::Config;
use audiodrop_storage::Storage;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    /// Bucket uploads are written into
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        Self { config, storage }
    }
}
