use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a recycling request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,
    Approved,
    Scheduled,
    Collected,
    Rejected,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 7] = [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Scheduled,
        RequestStatus::Collected,
        RequestStatus::Rejected,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Scheduled => "SCHEDULED",
            RequestStatus::Collected => "COLLECTED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Scheduled => "Scheduled",
            RequestStatus::Collected => "Collected",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Completed => "Completed",
            RequestStatus::Cancelled => "Cancelled",
        }
    }

    /// Items in these states have physically left the owner.
    pub fn is_recycled(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Collected)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// Device categories offered by the submission wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Mobile,
    Laptop,
    Desktop,
    Tablet,
    Printer,
    Monitor,
    Tv,
    Camera,
    Headphones,
    Other,
}

impl DeviceType {
    pub const ALL: [DeviceType; 10] = [
        DeviceType::Mobile,
        DeviceType::Laptop,
        DeviceType::Desktop,
        DeviceType::Tablet,
        DeviceType::Printer,
        DeviceType::Monitor,
        DeviceType::Tv,
        DeviceType::Camera,
        DeviceType::Headphones,
        DeviceType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Mobile => "MOBILE",
            DeviceType::Laptop => "LAPTOP",
            DeviceType::Desktop => "DESKTOP",
            DeviceType::Tablet => "TABLET",
            DeviceType::Printer => "PRINTER",
            DeviceType::Monitor => "MONITOR",
            DeviceType::Tv => "TV",
            DeviceType::Camera => "CAMERA",
            DeviceType::Headphones => "HEADPHONES",
            DeviceType::Other => "OTHER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceType::Mobile => "Mobile Phone",
            DeviceType::Laptop => "Laptop",
            DeviceType::Desktop => "Desktop",
            DeviceType::Tablet => "Tablet",
            DeviceType::Printer => "Printer",
            DeviceType::Monitor => "Monitor",
            DeviceType::Tv => "Television",
            DeviceType::Camera => "Camera",
            DeviceType::Headphones => "Headphones",
            DeviceType::Other => "Other",
        }
    }

    /// Lenient parse of a backend device string; anything unknown is `Other`.
    pub fn from_raw(raw: Option<&str>) -> DeviceType {
        raw.map(|value| value.trim().to_ascii_uppercase())
            .and_then(|value| DeviceType::ALL.into_iter().find(|d| d.as_str() == value))
            .unwrap_or(DeviceType::Other)
    }
}

/// Physical condition reported by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Working,
    Damaged,
    Broken,
    ForParts,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Working,
        Condition::Damaged,
        Condition::Broken,
        Condition::ForParts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Working => "WORKING",
            Condition::Damaged => "DAMAGED",
            Condition::Broken => "BROKEN",
            Condition::ForParts => "FOR_PARTS",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Condition::Working => "Working Perfectly",
            Condition::Damaged => "Damaged but Functional",
            Condition::Broken => "Broken/Not Working",
            Condition::ForParts => "For Parts Only",
        }
    }
}

// View of a backend request record. Fields the backend may omit are optional,
// and status/timestamps are kept raw so one malformed record never fails a
// whole list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecyclingRequest {
    pub id: i64,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub pickup_address: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub assigned_person_name: Option<String>,
    #[serde(default)]
    pub scheduled_pickup_date: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl RecyclingRequest {
    /// Parsed status; `None` when missing or not one of the known values.
    pub fn status(&self) -> Option<RequestStatus> {
        self.status.as_deref().and_then(|raw| raw.parse().ok())
    }

    pub fn has_status(&self, status: RequestStatus) -> bool {
        self.status() == Some(status)
    }

    /// Item count, defaulting to one when the backend omits it or sends zero.
    pub fn item_count(&self) -> u32 {
        self.quantity.filter(|quantity| *quantity > 0).unwrap_or(1)
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn updated_at(&self) -> Option<NaiveDateTime> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }
}

/// Roster entry returned by the admin pickup-person endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupPerson {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

/// One row of the per-status stats endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Parses the timestamp shapes the backend produces into local wall time:
/// RFC 3339 with an offset, a naive `LocalDateTime`, or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Local).naive_local());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
