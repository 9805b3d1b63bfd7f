// Domain-level errors shared by the ports and use cases.

/// Failure of a call to the backend or another remote collaborator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Missing, invalid or expired bearer token.
    #[error("unauthorized")]
    Unauthorized,
    /// The backend refused the body size (HTTP 413).
    #[error("payload too large")]
    PayloadTooLarge,
    /// Any other non-success status, with the backend message when it sent one.
    #[error("upstream error {status}")]
    Upstream { status: u16, message: Option<String> },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("response decode error: {0}")]
    Decode(String),
    #[error("request encode error: {0}")]
    Encode(String),
}

impl ApiError {
    /// Message for the end user: the backend's own text when available,
    /// otherwise the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Upstream {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Failure of durable client storage or of writing a download.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failure to obtain the device position.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported on this device")]
    Unsupported,
    #[error("unable to retrieve location: {0}")]
    Unavailable(String),
}
