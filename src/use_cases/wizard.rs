// Four-step request submission wizard as an explicit state machine.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{
    ApiError, Condition, DeviceType, Identity, ImageFile, ImageSlot, PortalApi, RequestSubmission,
    Route,
};
use crate::use_cases::session::SessionHolder;
use crate::use_cases::view_state::SESSION_EXPIRED;

pub const MIN_QUANTITY: u8 = 1;
pub const MAX_QUANTITY: u8 = 10;
/// How long the confirmation stays up before moving to the dashboard.
pub const SUBMITTED_REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    DeviceType,
    Details,
    ConditionAndPhotos,
    PickupAndSubmit,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        match self {
            WizardStep::DeviceType => 1,
            WizardStep::Details => 2,
            WizardStep::ConditionAndPhotos => 3,
            WizardStep::PickupAndSubmit => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::DeviceType => "Device Type",
            WizardStep::Details => "Details",
            WizardStep::ConditionAndPhotos => "Condition & Images",
            WizardStep::PickupAndSubmit => "Pickup Details",
        }
    }

    fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::DeviceType => Some(WizardStep::Details),
            WizardStep::Details => Some(WizardStep::ConditionAndPhotos),
            WizardStep::ConditionAndPhotos => Some(WizardStep::PickupAndSubmit),
            WizardStep::PickupAndSubmit => None,
        }
    }

    fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::DeviceType => None,
            WizardStep::Details => Some(WizardStep::DeviceType),
            WizardStep::ConditionAndPhotos => Some(WizardStep::Details),
            WizardStep::PickupAndSubmit => Some(WizardStep::ConditionAndPhotos),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Please select a device type.")]
    DeviceTypeMissing,
    #[error("Please enter the brand.")]
    BrandMissing,
    #[error("Please enter the model.")]
    ModelMissing,
    #[error("Please select a device condition.")]
    ConditionMissing,
    #[error("Please enter a pickup address.")]
    PickupAddressMissing,
    #[error("Quantity must be between 1 and 10.")]
    QuantityOutOfRange,
    #[error("There are no further steps.")]
    AlreadyOnLastStep,
    #[error("Finish the previous steps before submitting.")]
    NotOnFinalStep,
}

/// Everything entered so far. Never cleared by moving between steps.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardDraft {
    pub device_type: Option<DeviceType>,
    pub brand: String,
    pub model: String,
    pub quantity: u8,
    pub condition: Option<Condition>,
    pub images: BTreeMap<ImageSlot, ImageFile>,
    pub pickup_address: String,
    pub remarks: String,
}

impl Default for WizardDraft {
    fn default() -> Self {
        Self {
            device_type: None,
            brand: String::new(),
            model: String::new(),
            quantity: MIN_QUANTITY,
            condition: None,
            images: BTreeMap::new(),
            pickup_address: String::new(),
            remarks: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestWizard {
    step: WizardStep,
    draft: WizardDraft,
}

impl RequestWizard {
    /// Starts on the first step with the pickup address prefilled from the profile.
    pub fn new(identity: Option<&Identity>) -> Self {
        let pickup_address = identity
            .and_then(Identity::pickup_address)
            .unwrap_or_default()
            .to_string();
        Self {
            step: WizardStep::DeviceType,
            draft: WizardDraft {
                pickup_address,
                ..WizardDraft::default()
            },
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &WizardDraft {
        &self.draft
    }

    /// Picking a device moves straight to the details step.
    pub fn select_device(&mut self, device_type: DeviceType) {
        self.draft.device_type = Some(device_type);
        self.step = WizardStep::Details;
    }

    pub fn set_brand(&mut self, brand: impl Into<String>) {
        self.draft.brand = brand.into();
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.draft.model = model.into();
    }

    pub fn set_quantity(&mut self, quantity: u8) -> Result<(), WizardError> {
        if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
            return Err(WizardError::QuantityOutOfRange);
        }
        self.draft.quantity = quantity;
        Ok(())
    }

    pub fn increment_quantity(&mut self) -> u8 {
        self.draft.quantity = (self.draft.quantity + 1).min(MAX_QUANTITY);
        self.draft.quantity
    }

    pub fn decrement_quantity(&mut self) -> u8 {
        self.draft.quantity = self.draft.quantity.saturating_sub(1).max(MIN_QUANTITY);
        self.draft.quantity
    }

    pub fn select_condition(&mut self, condition: Condition) {
        self.draft.condition = Some(condition);
    }

    /// Stores a photo in its slot and hands back the one it replaced so the
    /// caller can release any preview made from it.
    pub fn attach_image(&mut self, slot: ImageSlot, file: ImageFile) -> Option<ImageFile> {
        self.draft.images.insert(slot, file)
    }

    pub fn remove_image(&mut self, slot: ImageSlot) -> Option<ImageFile> {
        self.draft.images.remove(&slot)
    }

    pub fn set_pickup_address(&mut self, address: impl Into<String>) {
        self.draft.pickup_address = address.into();
    }

    pub fn set_remarks(&mut self, remarks: impl Into<String>) {
        self.draft.remarks = remarks.into();
    }

    /// Guard for leaving the current step forwards.
    pub fn check_advance(&self) -> Result<(), WizardError> {
        if self.draft.device_type.is_none() {
            return Err(WizardError::DeviceTypeMissing);
        }
        match self.step {
            WizardStep::DeviceType => Ok(()),
            WizardStep::Details => {
                if is_blank(&self.draft.brand) {
                    Err(WizardError::BrandMissing)
                } else if is_blank(&self.draft.model) {
                    Err(WizardError::ModelMissing)
                } else {
                    Ok(())
                }
            }
            WizardStep::ConditionAndPhotos => match self.draft.condition {
                Some(_) => Ok(()),
                None => Err(WizardError::ConditionMissing),
            },
            WizardStep::PickupAndSubmit => Err(WizardError::AlreadyOnLastStep),
        }
    }

    pub fn can_advance(&self) -> bool {
        self.check_advance().is_ok()
    }

    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        self.check_advance()?;
        let next = self.step.next().ok_or(WizardError::AlreadyOnLastStep)?;
        self.step = next;
        Ok(next)
    }

    /// Steps back; a no-op on the first step.
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    pub fn check_submit(&self) -> Result<(), WizardError> {
        if self.step != WizardStep::PickupAndSubmit {
            return Err(WizardError::NotOnFinalStep);
        }
        if self.draft.condition.is_none() {
            return Err(WizardError::ConditionMissing);
        }
        if is_blank(&self.draft.pickup_address) {
            return Err(WizardError::PickupAddressMissing);
        }
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        self.check_submit().is_ok()
    }

    /// Builds the multipart body: scalar fields, then every filled photo slot
    /// in slot order under the shared "images" part name.
    pub fn to_submission(&self) -> Result<RequestSubmission, WizardError> {
        self.check_submit()?;
        let draft = &self.draft;
        let device_type = draft.device_type.ok_or(WizardError::DeviceTypeMissing)?;
        let condition = draft.condition.ok_or(WizardError::ConditionMissing)?;

        let fields = vec![
            ("deviceType", device_type.as_str().to_string()),
            ("brand", draft.brand.clone()),
            ("model", draft.model.clone()),
            ("condition", condition.as_str().to_string()),
            ("quantity", draft.quantity.to_string()),
            ("pickupAddress", draft.pickup_address.clone()),
            ("remarks", draft.remarks.clone()),
        ];

        Ok(RequestSubmission {
            fields,
            images: draft.images.values().cloned().collect(),
        })
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted { redirect: Route, after: Duration },
    /// No session at all; nothing was sent.
    LoginRequired { redirect: Route },
    /// The backend rejected the token.
    SessionExpired { redirect: Route },
    PayloadTooLarge,
    Invalid(WizardError),
    Failed(String),
}

impl SubmitOutcome {
    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Submitted { .. } => "Request submitted successfully!".to_string(),
            SubmitOutcome::LoginRequired { .. } => "Please login again.".to_string(),
            SubmitOutcome::SessionExpired { .. } => {
                SESSION_EXPIRED.to_string()
            }
            SubmitOutcome::PayloadTooLarge => "Files are too large!".to_string(),
            SubmitOutcome::Invalid(err) => err.to_string(),
            SubmitOutcome::Failed(message) => message.clone(),
        }
    }
}

// Submit use case with injected dependencies.
pub struct SubmitRequestUseCase {
    pub api: Arc<dyn PortalApi>,
    pub session: Arc<SessionHolder>,
}

impl SubmitRequestUseCase {
    #[tracing::instrument(name = "submit_request", skip_all)]
    pub async fn execute(&self, wizard: &RequestWizard) -> SubmitOutcome {
        if wizard.step() != WizardStep::PickupAndSubmit {
            return SubmitOutcome::Invalid(WizardError::NotOnFinalStep);
        }
        if !self.session.is_authenticated() {
            return SubmitOutcome::LoginRequired {
                redirect: Route::Login,
            };
        }

        let submission = match wizard.to_submission() {
            Ok(submission) => submission,
            Err(err) => return SubmitOutcome::Invalid(err),
        };
        let image_count = submission.images.len();

        match self.api.submit_request(submission).await {
            Ok(()) => {
                tracing::info!(image_count, "request submitted.");
                SubmitOutcome::Submitted {
                    redirect: Route::Dashboard,
                    after: SUBMITTED_REDIRECT_DELAY,
                }
            }
            Err(ApiError::Unauthorized) => SubmitOutcome::SessionExpired {
                redirect: Route::Login,
            },
            Err(ApiError::PayloadTooLarge) => {
                tracing::warn!(image_count, "submission rejected as too large.");
                SubmitOutcome::PayloadTooLarge
            }
            Err(err) => {
                tracing::error!(error = %err, "request submission failed.");
                SubmitOutcome::Failed(format!("Error: {}", err.user_message("Submission failed")))
            }
        }
    }
}
