//! Storage setup and initialization

use anyhow::{Context, Result};
use audiodrop_core::Config;
use audiodrop_storage::{create_storage, Storage};
use std::sync::Arc;

/// Open the bucket uploads are written into.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = %storage.backend_type(),
        bucket = %storage.bucket(),
        "Storage initialized"
    );
    Ok(storage)
}
