// Role dashboards: fetch, then derive everything locally with the aggregation helpers.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::domain::{ApiError, Clock, PickupPerson, PortalApi, RecyclingRequest, RequestStatus};
use crate::use_cases::aggregation::{
    ChartSlice, GroupCount, ImpactEstimate, MonthBucket, StatusCounts, Weight, count_where,
    device_groups, distinct_users, monthly_series, status_breakdown, status_counts, total_items,
};

pub const RECENT_LIMIT: usize = 5;
/// Flat payout per finished pickup.
pub const EARNINGS_PER_PICKUP: u64 = 15;
pub const NOT_AVAILABLE: &str = "N/A";
// Shown until the backend reports punctuality.
const ON_TIME_RATE_PLACEHOLDER: &str = "98%";

const RECYCLED: [RequestStatus; 2] = [RequestStatus::Completed, RequestStatus::Collected];
const OPEN_PICKUPS: [RequestStatus; 2] = [RequestStatus::Scheduled, RequestStatus::Pending];

#[derive(Debug, Clone, PartialEq)]
pub struct UserDashboard {
    pub counts: StatusCounts,
    pub total: usize,
    pub completed: u64,
    pub impact: ImpactEstimate,
    pub recent: Vec<RecyclingRequest>,
    pub devices: Vec<GroupCount>,
    pub statuses: Vec<ChartSlice>,
    pub monthly: [MonthBucket; 12],
}

pub fn build_user_dashboard(requests: &[RecyclingRequest]) -> UserDashboard {
    let counts = status_counts(requests);
    let completed = count_where(requests, &[RequestStatus::Completed]);
    UserDashboard {
        counts,
        total: requests.len(),
        completed,
        impact: ImpactEstimate::from_completed(completed),
        recent: requests.iter().take(RECENT_LIMIT).cloned().collect(),
        devices: device_groups(requests),
        statuses: status_breakdown(&counts),
        monthly: monthly_series(requests, Weight::PerRequest),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminDashboard {
    pub total_requests: usize,
    pub pending_requests: u64,
    pub completed_requests: u64,
    pub total_users: usize,
    pub pickup_persons: usize,
    pub items_recycled: u64,
    pub recent: Vec<RecyclingRequest>,
    pub devices: Vec<GroupCount>,
    pub statuses: Vec<ChartSlice>,
    pub monthly_items: [MonthBucket; 12],
}

pub fn build_admin_dashboard(
    requests: &[RecyclingRequest],
    roster: &[PickupPerson],
) -> AdminDashboard {
    AdminDashboard {
        total_requests: requests.len(),
        pending_requests: count_where(requests, &[RequestStatus::Pending]),
        completed_requests: count_where(requests, &RECYCLED),
        total_users: distinct_users(requests),
        pickup_persons: roster.len(),
        items_recycled: total_items(requests),
        recent: requests.iter().take(RECENT_LIMIT).cloned().collect(),
        devices: device_groups(requests),
        statuses: status_breakdown(&status_counts(requests)),
        monthly_items: monthly_series(requests, Weight::Quantity),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn of(request: &RecyclingRequest) -> Priority {
        match request.status() {
            Some(RequestStatus::Scheduled) => Priority::High,
            Some(RequestStatus::Pending) => Priority::Medium,
            _ => Priority::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub request: RecyclingRequest,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickupDashboard {
    pub assigned: u64,
    pub completed_today: u64,
    pub pending: u64,
    pub completed_total: u64,
    pub earnings: u64,
    pub average_rating: Option<f64>,
    pub on_time_rate: Option<&'static str>,
    pub recent: Vec<Assignment>,
}

impl PickupDashboard {
    /// Rating to one decimal, or "N/A" when nobody has rated yet.
    pub fn rating_label(&self) -> String {
        self.average_rating
            .map(|rating| format!("{rating:.1}"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn on_time_label(&self) -> &'static str {
        self.on_time_rate.unwrap_or(NOT_AVAILABLE)
    }
}

pub fn build_pickup_dashboard(requests: &[RecyclingRequest], clock: &dyn Clock) -> PickupDashboard {
    let today = clock.now().date();
    let completed_total = count_where(requests, &RECYCLED);

    let completed_today = requests
        .iter()
        .filter(|request| request.status().is_some_and(|status| status.is_recycled()))
        .filter(|request| {
            request
                .updated_at()
                .or_else(|| request.created_at())
                .is_some_and(|at| at.date() == today)
        })
        .count() as u64;

    let assigned = requests
        .iter()
        .filter(|request| !request.has_status(RequestStatus::Cancelled))
        .count() as u64;

    let ratings: Vec<f64> = requests
        .iter()
        .filter_map(|request| request.rating)
        .filter(|rating| *rating > 0.0)
        .collect();
    let average_rating =
        (!ratings.is_empty()).then(|| ratings.iter().sum::<f64>() / ratings.len() as f64);

    let mut queue: Vec<&RecyclingRequest> = requests.iter().collect();
    queue.sort_by(|a, b| scheduled_first_then_newest(a, b));
    let recent = queue
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|request| Assignment {
            priority: Priority::of(request),
            request: request.clone(),
        })
        .collect();

    PickupDashboard {
        assigned,
        completed_today,
        pending: count_where(requests, &OPEN_PICKUPS),
        completed_total,
        earnings: completed_total * EARNINGS_PER_PICKUP,
        average_rating,
        on_time_rate: (completed_total > 0).then_some(ON_TIME_RATE_PLACEHOLDER),
        recent,
    }
}

fn scheduled_first_then_newest(a: &RecyclingRequest, b: &RecyclingRequest) -> Ordering {
    let a_scheduled = a.has_status(RequestStatus::Scheduled);
    let b_scheduled = b.has_status(RequestStatus::Scheduled);
    b_scheduled
        .cmp(&a_scheduled)
        .then_with(|| b.created_at().cmp(&a.created_at()))
}

// Dashboard loaders with injected dependencies.
pub struct DashboardUseCase {
    pub api: Arc<dyn PortalApi>,
    pub clock: Arc<dyn Clock>,
}

impl DashboardUseCase {
    #[tracing::instrument(name = "user_dashboard", skip_all)]
    pub async fn user(&self) -> Result<UserDashboard, ApiError> {
        let requests = self.api.my_requests().await?;
        tracing::debug!(count = requests.len(), "user requests fetched.");
        Ok(build_user_dashboard(&requests))
    }

    /// Fetches requests and roster together; either failure aborts the whole view.
    #[tracing::instrument(name = "admin_dashboard", skip_all)]
    pub async fn admin(&self) -> Result<AdminDashboard, ApiError> {
        let (requests, roster) =
            futures::try_join!(self.api.all_requests(), self.api.pickup_persons())?;
        tracing::debug!(
            requests = requests.len(),
            pickup_persons = roster.len(),
            "admin data fetched."
        );
        Ok(build_admin_dashboard(&requests, &roster))
    }

    #[tracing::instrument(name = "pickup_dashboard", skip_all)]
    pub async fn pickup(&self) -> Result<PickupDashboard, ApiError> {
        let requests = self.api.assigned_requests().await?;
        tracing::debug!(count = requests.len(), "assigned requests fetched.");
        Ok(build_pickup_dashboard(&requests, self.clock.as_ref()))
    }
}
