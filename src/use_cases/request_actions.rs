// Admin moderation and pickup-person status changes on existing requests.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::domain::{
    ApiError, PortalApi, RecyclingRequest, RequestStatus, ScheduleRequest, StatusUpdateRequest,
};
use crate::use_cases::view_state::SESSION_EXPIRED;

pub const STATUS_UPDATE_FAILED: &str = "Error updating request status";
pub const SCHEDULE_FAILED: &str = "Error scheduling pickup";
pub const PICKUP_SCHEDULED: &str = "Pickup scheduled successfully!";
pub const ASSIGNMENT_UPDATE_FAILED: &str = "Failed to update status. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("Pickup staff can only mark requests as Collected or Completed.")]
    NotAllowedForPickup(RequestStatus),
    #[error("Pickup time does not exist in the local time zone.")]
    NonexistentPickupTime(NaiveDateTime),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Applied; the caller refetches its list.
    Done(Option<&'static str>),
    Invalid(ActionError),
    SessionExpired,
    Failed(String),
}

impl ActionOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, ActionOutcome::Done(_))
    }

    pub fn message(&self) -> Option<String> {
        match self {
            ActionOutcome::Done(message) => message.map(str::to_string),
            ActionOutcome::Invalid(err) => Some(err.to_string()),
            ActionOutcome::SessionExpired => Some(SESSION_EXPIRED.to_string()),
            ActionOutcome::Failed(message) => Some(message.clone()),
        }
    }
}

/// Admin list filter: exact status (or all) plus a case-insensitive search
/// over device type, brand, model and owner name.
pub fn filter_requests(
    records: &[RecyclingRequest],
    status: Option<RequestStatus>,
    search: &str,
) -> Vec<RecyclingRequest> {
    let needle = search.trim().to_lowercase();
    let contains = |value: &Option<String>| {
        value
            .as_deref()
            .is_some_and(|value| value.to_lowercase().contains(&needle))
    };

    records
        .iter()
        .filter(|record| status.is_none_or(|wanted| record.status() == Some(wanted)))
        .filter(|record| {
            needle.is_empty()
                || contains(&record.device_type)
                || contains(&record.brand)
                || contains(&record.model)
                || contains(&record.user_name)
        })
        .cloned()
        .collect()
}

// Request management with injected dependencies.
pub struct RequestActionsUseCase {
    pub api: Arc<dyn PortalApi>,
}

impl RequestActionsUseCase {
    pub async fn approve(&self, request_id: i64) -> ActionOutcome {
        self.update_status(request_id, RequestStatus::Approved, None)
            .await
    }

    pub async fn reject(&self, request_id: i64, reason: &str) -> ActionOutcome {
        self.update_status(request_id, RequestStatus::Rejected, Some(reason))
            .await
    }

    /// Admin status change. A blank reason is not sent.
    #[tracing::instrument(name = "update_request_status", skip(self, rejection_reason))]
    pub async fn update_status(
        &self,
        request_id: i64,
        status: RequestStatus,
        rejection_reason: Option<&str>,
    ) -> ActionOutcome {
        let update = StatusUpdateRequest {
            status: status.as_str().to_string(),
            rejection_reason: rejection_reason
                .map(str::trim)
                .filter(|reason| !reason.is_empty())
                .map(str::to_string),
        };

        match self.api.update_request_status(request_id, update).await {
            Ok(()) => {
                tracing::info!(request_id, %status, "request status updated.");
                ActionOutcome::Done(None)
            }
            Err(err) => failed(err, STATUS_UPDATE_FAILED),
        }
    }

    /// Assigns a pickup person and time. `pickup_at` is local wall time; the
    /// backend takes a UTC instant.
    #[tracing::instrument(name = "schedule_pickup", skip(self))]
    pub async fn schedule(
        &self,
        request_id: i64,
        pickup_at: NaiveDateTime,
        pickup_person_id: i64,
    ) -> ActionOutcome {
        let Some(pickup_date) = pickup_instant(pickup_at) else {
            return ActionOutcome::Invalid(ActionError::NonexistentPickupTime(pickup_at));
        };
        let schedule = ScheduleRequest {
            pickup_date,
            pickup_person_id,
        };

        match self.api.schedule_pickup(request_id, schedule).await {
            Ok(()) => {
                tracing::info!(request_id, pickup_person_id, "pickup scheduled.");
                ActionOutcome::Done(Some(PICKUP_SCHEDULED))
            }
            Err(err) => failed(err, SCHEDULE_FAILED),
        }
    }

    /// Pickup-person progress on an assignment: only Collected or Completed.
    #[tracing::instrument(name = "update_assignment", skip(self))]
    pub async fn mark_assignment(&self, request_id: i64, status: RequestStatus) -> ActionOutcome {
        if !status.is_recycled() {
            return ActionOutcome::Invalid(ActionError::NotAllowedForPickup(status));
        }
        let update = StatusUpdateRequest {
            status: status.as_str().to_string(),
            rejection_reason: None,
        };

        match self.api.update_request_status(request_id, update).await {
            Ok(()) => {
                tracing::info!(request_id, %status, "assignment updated.");
                ActionOutcome::Done(None)
            }
            Err(err) => failed(err, ASSIGNMENT_UPDATE_FAILED),
        }
    }
}

// Ambiguous wall times (clocks going back) take the earlier instant.
fn pickup_instant(local: NaiveDateTime) -> Option<String> {
    Local
        .from_local_datetime(&local)
        .earliest()
        .map(|at| at.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn failed(err: ApiError, message: &str) -> ActionOutcome {
    if err.is_unauthorized() {
        return ActionOutcome::SessionExpired;
    }
    tracing::error!(error = %err, "request action failed.");
    ActionOutcome::Failed(message.to_string())
}
