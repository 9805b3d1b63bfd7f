use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::errors::{ApiError, GeolocationError, StorageError};

// Port for the durable client-side key-value storage that survives reloads.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Raw coordinate string used when no address can be resolved.
    pub fn describe(&self) -> String {
        format!("Lat: {}, Long: {}", self.latitude, self.longitude)
    }
}

// Port for the device position provider.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

// Shared handles stand in for the provider itself.
#[async_trait]
impl<T: Geolocator + ?Sized> Geolocator for Arc<T> {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        (**self).current_position().await
    }
}

// Port for the third-party reverse-geocoding lookup.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Display address for the position, `None` when the service knows none.
    async fn reverse(&self, position: Coordinates) -> Result<Option<String>, ApiError>;
}

#[async_trait]
impl<T: ReverseGeocoder + ?Sized> ReverseGeocoder for Arc<T> {
    async fn reverse(&self, position: Coordinates) -> Result<Option<String>, ApiError> {
        (**self).reverse(position).await
    }
}

// Port for handing a generated file to the user.
pub trait DownloadSink: Send + Sync {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError>;
}

// Port for retrieving the current local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}
