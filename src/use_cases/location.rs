use crate::domain::{GeolocationError, Geolocator, ReverseGeocoder};

#[derive(Debug, Clone, PartialEq)]
pub enum LocationOutcome {
    /// The geocoder resolved a display address.
    Resolved(String),
    /// Position known but no address; the raw coordinates are used instead.
    Coordinates(String),
    /// No position at all; the address field is left as it was.
    Failed(String),
}

impl LocationOutcome {
    /// Value to put into the pickup address field, if any.
    pub fn address(&self) -> Option<&str> {
        match self {
            LocationOutcome::Resolved(address) | LocationOutcome::Coordinates(address) => {
                Some(address)
            }
            LocationOutcome::Failed(_) => None,
        }
    }
}

// User-triggered "use my current location" helper for the pickup step.
pub struct LocationAssist<G, R> {
    pub geolocator: G,
    pub geocoder: R,
}

impl<G, R> LocationAssist<G, R>
where
    G: Geolocator,
    R: ReverseGeocoder,
{
    pub async fn locate(&self) -> LocationOutcome {
        let position = match self.geolocator.current_position().await {
            Ok(position) => position,
            Err(GeolocationError::Unsupported) => {
                return LocationOutcome::Failed(
                    "Geolocation is not supported by your browser.".to_string(),
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to get device position.");
                return LocationOutcome::Failed(
                    "Unable to retrieve location. Please check your browser permissions."
                        .to_string(),
                );
            }
        };

        match self.geocoder.reverse(position).await {
            Ok(Some(address)) if !address.trim().is_empty() => LocationOutcome::Resolved(address),
            Ok(_) => LocationOutcome::Coordinates(position.describe()),
            Err(err) => {
                tracing::warn!(error = %err, "reverse geocoding failed; using coordinates.");
                LocationOutcome::Coordinates(position.describe())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiError, Coordinates};
    use async_trait::async_trait;

    struct FixedPosition(Result<Coordinates, GeolocationError>);

    #[async_trait]
    impl Geolocator for FixedPosition {
        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            self.0.clone()
        }
    }

    struct FixedAddress(Result<Option<String>, ApiError>);

    #[async_trait]
    impl ReverseGeocoder for FixedAddress {
        async fn reverse(&self, _position: Coordinates) -> Result<Option<String>, ApiError> {
            self.0.clone()
        }
    }

    const HERE: Coordinates = Coordinates {
        latitude: 19.076,
        longitude: 72.8777,
    };

    #[tokio::test]
    async fn when_geocoder_resolves_then_uses_display_address() {
        let assist = LocationAssist {
            geolocator: FixedPosition(Ok(HERE)),
            geocoder: FixedAddress(Ok(Some("Marine Drive, Mumbai".to_string()))),
        };

        let outcome = assist.locate().await;

        assert_eq!(outcome.address(), Some("Marine Drive, Mumbai"));
    }

    #[tokio::test]
    async fn when_geocoder_fails_or_knows_nothing_then_falls_back_to_coordinates() {
        for answer in [Err(ApiError::Transport("offline".to_string())), Ok(None)] {
            let assist = LocationAssist {
                geolocator: FixedPosition(Ok(HERE)),
                geocoder: FixedAddress(answer),
            };

            let outcome = assist.locate().await;

            assert_eq!(
                outcome,
                LocationOutcome::Coordinates("Lat: 19.076, Long: 72.8777".to_string())
            );
        }
    }

    #[tokio::test]
    async fn when_position_is_unavailable_then_reports_error_and_leaves_field_alone() {
        let assist = LocationAssist {
            geolocator: FixedPosition(Err(GeolocationError::Unavailable("denied".to_string()))),
            geocoder: FixedAddress(Ok(Some("unused".to_string()))),
        };

        let outcome = assist.locate().await;

        assert_eq!(
            outcome,
            LocationOutcome::Failed(
                "Unable to retrieve location. Please check your browser permissions.".to_string()
            )
        );
        assert!(outcome.address().is_none());
    }

    #[tokio::test]
    async fn when_geolocation_is_unsupported_then_says_so() {
        let assist = LocationAssist {
            geolocator: FixedPosition(Err(GeolocationError::Unsupported)),
            geocoder: FixedAddress(Ok(None)),
        };

        let outcome = assist.locate().await;

        assert_eq!(
            outcome,
            LocationOutcome::Failed("Geolocation is not supported by your browser.".to_string())
        );
    }
}
