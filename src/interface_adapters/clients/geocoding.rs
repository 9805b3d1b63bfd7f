use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::domain::{ApiError, Coordinates, ReverseGeocoder};
use crate::interface_adapters::clients::ClientBuildError;
use crate::interface_adapters::protocol::{ReverseGeocodeResponse, error_message};

// Public geocoding services reject anonymous clients.
const USER_AGENT: &str = concat!("ecowaste-portal/", env!("CARGO_PKG_VERSION"));

// Best-effort reverse lookup against a Nominatim-compatible service.
#[derive(Clone)]
pub struct NominatimClient {
    http: Client,
    reverse_url: Url,
}

impl NominatimClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientBuildError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let reverse_url = Url::parse(&format!("{}/reverse", base_url.trim_end_matches('/')))?;

        Ok(Self {
            http: builder.build()?,
            reverse_url,
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn reverse(&self, position: Coordinates) -> Result<Option<String>, ApiError> {
        let mut url = self.reverse_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &position.latitude.to_string())
            .append_pair("lon", &position.longitude.to_string());

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let payload = res
            .json::<ReverseGeocodeResponse>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(payload
            .display_name
            .filter(|address| !address.trim().is_empty()))
    }
}
