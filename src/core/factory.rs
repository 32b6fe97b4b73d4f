//! Application Factory
//!
//! Builds the `AppState` from configuration, preparing the data directory
//! that exports are written to.

use crate::core::app_state::AppState;
use crate::core::config::Config;
use crate::core::error::{Error, Result};

/// Create AppState based on configuration
///
/// # Errors
///
/// `Error::Config` when the data directory cannot be created.
pub fn create_app_state(config: Config) -> Result<AppState> {
    let data_dir = &config.storage.data_dir;
    if !data_dir.exists() {
        std::fs::create_dir_all(data_dir).map_err(|e| {
            Error::config(format!("Cannot create data directory {:?}: {}", data_dir, e))
        })?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    tracing::info!(
        "Creating AppState (match tolerance {}, max import {} bytes)",
        config.graph.match_tolerance,
        config.storage.max_import_bytes
    );
    Ok(AppState::new(config))
}
