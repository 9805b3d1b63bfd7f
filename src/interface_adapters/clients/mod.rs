// The clients defined here are reqwest clients for the backend and third-party services.

mod backend;
mod geocoding;

pub use backend::BackendClient;
pub use geocoding::NominatimClient;

#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("invalid service url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}
