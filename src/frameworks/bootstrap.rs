use std::sync::Arc;

use crate::domain::StorageError;
use crate::frameworks::config::{ConfigError, PortalConfig};
use crate::frameworks::telemetry::init_tracing;
use crate::interface_adapters::clients::{BackendClient, ClientBuildError, NominatimClient};
use crate::interface_adapters::device::{StaticGeolocator, SystemClock};
use crate::interface_adapters::downloads::DirectorySink;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::storage::FileKeyValueStore;
use crate::use_cases::SessionHolder;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientBuildError),
    #[error("failed to open client storage: {0}")]
    Storage(#[from] StorageError),
}

/// Loads `.env` and config, installs tracing, and returns a ready state with
/// any persisted session already restored.
pub fn start() -> Result<AppState, BootstrapError> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = PortalConfig::load()?;
    build_state(&config)
}

pub fn build_state(config: &PortalConfig) -> Result<AppState, BootstrapError> {
    let timeout = config.http_timeout();
    tracing::debug!(
        api_url = %config.api_url,
        geocoder_url = %config.geocoder_url,
        ?timeout,
        "clients configured."
    );

    let api = Arc::new(BackendClient::new(&config.api_url, timeout)?);
    let geocoder = Arc::new(NominatimClient::new(&config.geocoder_url, timeout)?);
    let store = Arc::new(FileKeyValueStore::open(&config.storage_path)?);
    let geolocator = Arc::new(StaticGeolocator {
        position: config.device_position()?,
    });

    let session = Arc::new(SessionHolder::restore(api.clone(), store));
    tracing::info!(
        signed_in = session.is_authenticated(),
        storage = %config.storage_path.display(),
        "portal ready."
    );

    Ok(AppState {
        api,
        session,
        geolocator,
        geocoder,
        downloads: Arc::new(DirectorySink::new(config.download_dir.clone())),
        clock: Arc::new(SystemClock),
    })
}
