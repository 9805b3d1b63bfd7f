use std::sync::Arc;

use serde_json::Value;

use crate::domain::{
    ApiError, Identity, IdentityUpdate, PortalApi, ProfileUpdateRequest, Role, Route,
};
use crate::use_cases::session::SessionHolder;
use crate::use_cases::view_state::SESSION_EXPIRED;

pub const PROFILE_UPDATED: &str = "Profile updated successfully!";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("New passwords do not match.")]
    PasswordMismatch,
}

/// Editable profile fields, seeded from the current identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub vehicle_number: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ProfileForm {
    pub fn from_identity(identity: &Identity) -> Self {
        let phone = identity
            .phone_number
            .clone()
            .or_else(|| {
                identity
                    .extra
                    .get("phone")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_default();

        Self {
            name: identity.name.clone(),
            email: identity.email.clone(),
            phone,
            address: identity.pickup_address().unwrap_or_default().to_string(),
            vehicle_number: identity.vehicle_number.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if !self.new_password.is_empty() && self.new_password != self.confirm_password {
            return Err(ProfileError::PasswordMismatch);
        }
        Ok(())
    }

    /// Password fields ride along only when both are filled; the vehicle
    /// number only for pickup staff.
    pub fn to_request(&self, role: Role) -> ProfileUpdateRequest {
        let change_password = !self.current_password.is_empty() && !self.new_password.is_empty();
        ProfileUpdateRequest {
            name: self.name.clone(),
            contact_info: self.phone.clone(),
            pickup_address: self.address.clone(),
            vehicle_number: (role == Role::PickupPerson).then(|| self.vehicle_number.clone()),
            current_password: change_password.then(|| self.current_password.clone()),
            new_password: change_password.then(|| self.new_password.clone()),
        }
    }

    fn clear_passwords(&mut self) {
        self.current_password.clear();
        self.new_password.clear();
        self.confirm_password.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileOutcome {
    Updated(Identity),
    Invalid(ProfileError),
    LoginRequired { redirect: Route },
    /// The backend rejected the token.
    SessionExpired { redirect: Route },
    Failed(String),
}

impl ProfileOutcome {
    pub fn message(&self) -> String {
        match self {
            ProfileOutcome::Updated(_) => PROFILE_UPDATED.to_string(),
            ProfileOutcome::Invalid(err) => err.to_string(),
            ProfileOutcome::LoginRequired { .. } => "Please login again.".to_string(),
            ProfileOutcome::SessionExpired { .. } => SESSION_EXPIRED.to_string(),
            ProfileOutcome::Failed(message) => message.clone(),
        }
    }
}

// Profile settings use case with injected dependencies.
pub struct ProfileUseCase {
    pub api: Arc<dyn PortalApi>,
    pub session: Arc<SessionHolder>,
}

impl ProfileUseCase {
    #[tracing::instrument(name = "update_profile", skip_all)]
    pub async fn update(&self, form: &mut ProfileForm) -> ProfileOutcome {
        if let Err(err) = form.validate() {
            return ProfileOutcome::Invalid(err);
        }
        let Some(identity) = self.session.identity() else {
            return ProfileOutcome::LoginRequired {
                redirect: Route::Login,
            };
        };

        let request = form.to_request(identity.role());
        let update = IdentityUpdate {
            name: Some(request.name.clone()),
            phone_number: Some(request.contact_info.clone()),
            address: Some(request.pickup_address.clone()),
            vehicle_number: request.vehicle_number.clone(),
        };

        match self.api.update_profile(request).await {
            Ok(()) => {}
            Err(ApiError::Unauthorized) => {
                return ProfileOutcome::SessionExpired {
                    redirect: Route::Login,
                };
            }
            Err(err) => {
                tracing::warn!(error = %err, "profile update rejected.");
                return ProfileOutcome::Failed(err.user_message("Failed to update profile."));
            }
        }

        form.clear_passwords();
        match self.session.update_identity(update) {
            Some(identity) => ProfileOutcome::Updated(identity),
            // Signed out while the call was in flight.
            None => ProfileOutcome::LoginRequired {
                redirect: Route::Login,
            },
        }
    }
}
