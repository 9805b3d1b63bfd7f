use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account roles the portal distinguishes between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
    PickupPerson,
}

impl Role {
    /// Normalizes the role spellings the backend emits ("ADMIN", "ROLE_ADMIN",
    /// "pickup-person", ...). Unknown or absent roles are plain users.
    pub fn from_raw(raw: Option<&str>) -> Role {
        let Some(raw) = raw else {
            return Role::User;
        };

        let normalized = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        let bare = normalized.strip_prefix("ROLE_").unwrap_or(&normalized);

        match bare {
            "ADMIN" => Role::Admin,
            "PICKUP_PERSON" => Role::PickupPerson,
            _ => Role::User,
        }
    }
}

// Snapshot of the authenticated account as returned by the backend.
// Unknown fields are kept so the persisted snapshot round-trips untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    pub fn role(&self) -> Role {
        Role::from_raw(self.role.as_deref())
    }

    /// Address used to prefill the pickup step of the wizard. Some backends
    /// send a dedicated `pickupAddress` next to the profile address.
    pub fn pickup_address(&self) -> Option<&str> {
        let non_blank = |value: &&str| !value.trim().is_empty();
        self.extra
            .get("pickupAddress")
            .and_then(Value::as_str)
            .filter(non_blank)
            .or_else(|| self.address.as_deref().filter(non_blank))
    }

    pub fn apply(&mut self, update: IdentityUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(phone_number) = update.phone_number {
            self.phone_number = Some(phone_number);
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        if let Some(vehicle_number) = update.vehicle_number {
            self.vehicle_number = Some(vehicle_number);
        }
    }
}

/// Partial identity edit merged over the current snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub vehicle_number: Option<String>,
}

// Token and identity only ever exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
}
