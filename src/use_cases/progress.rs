use std::sync::Arc;

use crate::domain::{ApiError, PortalApi, RecyclingRequest, RequestStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Completed,
    Rejected,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Submitted,
    Approved,
    Scheduled,
    Collected,
    Recycled,
}

impl Stage {
    pub const TIMELINE: [Stage; 5] = [
        Stage::Submitted,
        Stage::Approved,
        Stage::Scheduled,
        Stage::Collected,
        Stage::Recycled,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Stage::Submitted => "Submitted",
            Stage::Approved => "Verified & Approved",
            Stage::Scheduled => "Pickup Scheduled",
            Stage::Collected => "Collected",
            Stage::Recycled => "Recycled & Completed",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::Submitted => "Your request has been received",
            Stage::Approved => "Request reviewed and approved",
            Stage::Scheduled => "Pickup date confirmed",
            Stage::Collected => "Items collected by our team",
            Stage::Recycled => "Items processed and recycled",
        }
    }

    // Statuses at or past this stage.
    fn completed_by(self) -> &'static [RequestStatus] {
        match self {
            Stage::Submitted => &RequestStatus::ALL,
            Stage::Approved => &[
                RequestStatus::Approved,
                RequestStatus::Scheduled,
                RequestStatus::Collected,
                RequestStatus::Completed,
            ],
            Stage::Scheduled => &[
                RequestStatus::Scheduled,
                RequestStatus::Collected,
                RequestStatus::Completed,
            ],
            Stage::Collected => &[RequestStatus::Collected, RequestStatus::Completed],
            Stage::Recycled => &[RequestStatus::Completed],
        }
    }

    /// Node state for a request status. Submitted holds for any existing record.
    pub fn state_for(self, status: Option<RequestStatus>) -> StageState {
        if self == Stage::Submitted {
            return StageState::Completed;
        }
        if self == Stage::Approved && status == Some(RequestStatus::Rejected) {
            return StageState::Rejected;
        }
        match status {
            Some(status) if self.completed_by().contains(&status) => StageState::Completed,
            _ => StageState::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineNode {
    pub stage: Stage,
    pub state: StageState,
    // Only the submitted and scheduled nodes carry a date.
    pub date: Option<String>,
}

pub fn timeline(request: &RecyclingRequest) -> [TimelineNode; 5] {
    let status = request.status();
    Stage::TIMELINE.map(|stage| TimelineNode {
        stage,
        state: stage.state_for(status),
        date: match stage {
            Stage::Submitted => request.created_at.clone(),
            Stage::Scheduled => request.scheduled_pickup_date.clone(),
            _ => None,
        },
    })
}

/// The user's requests, newest first, with one selected.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressBoard {
    requests: Vec<RecyclingRequest>,
    selected: usize,
}

impl ProgressBoard {
    pub fn new(mut requests: Vec<RecyclingRequest>) -> Self {
        requests.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Self {
            requests,
            selected: 0,
        }
    }

    pub fn requests(&self) -> &[RecyclingRequest] {
        &self.requests
    }

    pub fn selected(&self) -> Option<&RecyclingRequest> {
        self.requests.get(self.selected)
    }

    /// Switches the selection without refetching; unknown ids are ignored.
    pub fn select(&mut self, request_id: i64) -> bool {
        match self.requests.iter().position(|r| r.id == request_id) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    pub fn selected_timeline(&self) -> Option<[TimelineNode; 5]> {
        self.selected().map(timeline)
    }

    pub fn completed_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| r.has_status(RequestStatus::Completed))
            .count()
    }

    pub fn in_progress_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| {
                !(r.has_status(RequestStatus::Completed) || r.has_status(RequestStatus::Rejected))
            })
            .count()
    }
}

pub struct ProgressUseCase {
    pub api: Arc<dyn PortalApi>,
}

impl ProgressUseCase {
    pub async fn load(&self) -> Result<ProgressBoard, ApiError> {
        let requests = self.api.my_requests().await?;
        Ok(ProgressBoard::new(requests))
    }
}
