// Host-provided time and position.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};

use crate::domain::{Clock, Coordinates, GeolocationError, Geolocator};

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

// Position configured by the host. `None` means the host has no geolocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticGeolocator {
    pub position: Option<Coordinates>,
}

#[async_trait]
impl Geolocator for StaticGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.position.ok_or(GeolocationError::Unsupported)
    }
}
