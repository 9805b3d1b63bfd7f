use serde::Deserialize;

// Error body the backend sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Backend error text: the JSON `message` when present, else the raw body.
pub fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(payload) => payload.message.filter(|message| !message.trim().is_empty()),
        // A JSON object without `message` carries nothing worth showing.
        Err(_) if body.starts_with('{') => None,
        Err(_) => Some(body.to_string()),
    }
}

// Reverse-geocoding answer; only the display address is used.
#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeResponse {
    #[serde(default)]
    pub display_name: Option<String>,
}
