use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::ApiError;
use crate::domain::identity::Identity;
use crate::domain::request::{PickupPerson, RecyclingRequest, StatusCount};

// The serialization within this layer is a dependency leak, but its a pragmatic approach.
// Payloads exchanged with the backend REST API.

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    // Absent when the backend answers 2xx without issuing a token.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<Identity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: String,
    pub contact_info: String,
    pub pickup_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    // ISO 8601 instant, e.g. "2025-06-01T09:30:00Z".
    pub pickup_date: String,
    pub pickup_person_id: i64,
}

/// Named photo slots of the submission wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageSlot {
    Front,
    Back,
    Left,
    Right,
    Accessories,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 5] = [
        ImageSlot::Front,
        ImageSlot::Back,
        ImageSlot::Left,
        ImageSlot::Right,
        ImageSlot::Accessories,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ImageSlot::Front => "front",
            ImageSlot::Back => "back",
            ImageSlot::Left => "left",
            ImageSlot::Right => "right",
            ImageSlot::Accessories => "accessories",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageSlot::Front => "Front Side",
            ImageSlot::Back => "Back Side",
            ImageSlot::Left => "Left Side",
            ImageSlot::Right => "Right Side",
            ImageSlot::Accessories => "Accessories/Other",
        }
    }

    /// Slots labelled as required in the form.
    pub fn is_required(self) -> bool {
        matches!(self, ImageSlot::Front | ImageSlot::Back)
    }
}

/// In-memory photo picked by the user, held until submission or removal.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Multipart body for `POST /api/requests`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSubmission {
    // Scalar form fields in submission order.
    pub fields: Vec<(&'static str, String)>,
    // Files sent under the repeated "images" part name.
    pub images: Vec<ImageFile>,
}

// Use cases depend on this trait, not the concrete reqwest client.
// Dependencies point inwards to the domain layer.
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Replaces the bearer token attached to every subsequent call.
    fn set_bearer(&self, token: Option<String>);

    async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ApiError>;
    async fn register(&self, req: RegistrationRequest) -> Result<(), ApiError>;

    async fn my_requests(&self) -> Result<Vec<RecyclingRequest>, ApiError>;
    async fn submit_request(&self, submission: RequestSubmission) -> Result<(), ApiError>;
    async fn all_requests(&self) -> Result<Vec<RecyclingRequest>, ApiError>;
    async fn pickup_persons(&self) -> Result<Vec<PickupPerson>, ApiError>;
    async fn assigned_requests(&self) -> Result<Vec<RecyclingRequest>, ApiError>;

    async fn update_request_status(
        &self,
        request_id: i64,
        update: StatusUpdateRequest,
    ) -> Result<(), ApiError>;
    async fn schedule_pickup(&self, request_id: i64, schedule: ScheduleRequest)
    -> Result<(), ApiError>;

    async fn my_status_counts(&self) -> Result<Vec<StatusCount>, ApiError>;
    async fn certificate_pdf(&self) -> Result<Vec<u8>, ApiError>;
    async fn update_profile(&self, req: ProfileUpdateRequest) -> Result<(), ApiError>;
}
