// Pure derivations over a fetched request list. Recomputed from scratch on every fetch.

use std::collections::HashSet;

use chrono::Datelike;

use crate::domain::{RecyclingRequest, RequestStatus};

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// Slice order of the status pie chart. Cancelled is never charted.
const CHARTED_STATUSES: [RequestStatus; 6] = [
    RequestStatus::Completed,
    RequestStatus::Pending,
    RequestStatus::Approved,
    RequestStatus::Scheduled,
    RequestStatus::Collected,
    RequestStatus::Rejected,
];

/// Requests per status. Missing or unrecognised statuses count as pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: u64,
    pub approved: u64,
    pub scheduled: u64,
    pub collected: u64,
    pub rejected: u64,
    pub completed: u64,
    pub cancelled: u64,
}

impl StatusCounts {
    pub fn get(&self, status: RequestStatus) -> u64 {
        match status {
            RequestStatus::Pending => self.pending,
            RequestStatus::Approved => self.approved,
            RequestStatus::Scheduled => self.scheduled,
            RequestStatus::Collected => self.collected,
            RequestStatus::Rejected => self.rejected,
            RequestStatus::Completed => self.completed,
            RequestStatus::Cancelled => self.cancelled,
        }
    }

    fn bump(&mut self, status: RequestStatus) {
        let slot = match status {
            RequestStatus::Pending => &mut self.pending,
            RequestStatus::Approved => &mut self.approved,
            RequestStatus::Scheduled => &mut self.scheduled,
            RequestStatus::Collected => &mut self.collected,
            RequestStatus::Rejected => &mut self.rejected,
            RequestStatus::Completed => &mut self.completed,
            RequestStatus::Cancelled => &mut self.cancelled,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u64 {
        RequestStatus::ALL.into_iter().map(|status| self.get(status)).sum()
    }
}

pub fn status_counts(records: &[RecyclingRequest]) -> StatusCounts {
    records.iter().fold(StatusCounts::default(), |mut counts, record| {
        counts.bump(record.status().unwrap_or(RequestStatus::Pending));
        counts
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSlice {
    pub name: &'static str,
    pub value: u64,
}

/// Non-empty status slices in chart order.
pub fn status_breakdown(counts: &StatusCounts) -> Vec<ChartSlice> {
    CHARTED_STATUSES
        .into_iter()
        .map(|status| ChartSlice {
            name: status.label(),
            value: counts.get(status),
        })
        .filter(|slice| slice.value > 0)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub name: String,
    pub count: u64,
}

/// Requests per device type in first-seen order; a missing type is "Other".
pub fn device_groups(records: &[RecyclingRequest]) -> Vec<GroupCount> {
    let mut groups: Vec<GroupCount> = Vec::new();
    for record in records {
        let name = record
            .device_type
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or("Other");
        match groups.iter_mut().find(|group| group.name == name) {
            Some(group) => group.count += 1,
            None => groups.push(GroupCount {
                name: name.to_string(),
                count: 1,
            }),
        }
    }
    groups
}

/// What each record contributes to its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    PerRequest,
    Quantity,
}

impl Weight {
    fn of(self, record: &RecyclingRequest) -> u64 {
        match self {
            Weight::PerRequest => 1,
            Weight::Quantity => u64::from(record.item_count()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBucket {
    pub month: &'static str,
    pub value: u64,
}

/// Jan..Dec series bucketed by creation month. Records without a readable
/// creation date are skipped.
pub fn monthly_series(records: &[RecyclingRequest], weight: Weight) -> [MonthBucket; 12] {
    let mut totals = [0u64; 12];
    for record in records {
        if let Some(created) = record.created_at() {
            totals[created.month0() as usize] += weight.of(record);
        }
    }
    std::array::from_fn(|index| MonthBucket {
        month: MONTHS[index],
        value: totals[index],
    })
}

pub fn total_items(records: &[RecyclingRequest]) -> u64 {
    records.iter().map(|record| u64::from(record.item_count())).sum()
}

pub fn count_where(records: &[RecyclingRequest], statuses: &[RequestStatus]) -> u64 {
    records
        .iter()
        .filter(|record| record.status().is_some_and(|status| statuses.contains(&status)))
        .count() as u64
}

/// Distinct requesters, keyed by user id and falling back to email.
pub fn distinct_users(records: &[RecyclingRequest]) -> usize {
    records
        .iter()
        .filter_map(|record| match (record.user_id, record.user_email.as_deref()) {
            (Some(id), _) => Some(id.to_string()),
            (None, Some(email)) if !email.is_empty() => Some(email.to_string()),
            _ => None,
        })
        .collect::<HashSet<_>>()
        .len()
}

pub const CO2_KG_PER_ITEM: f64 = 2.5;
pub const TOXIC_KG_PER_ITEM: f64 = 0.8;
pub const ENERGY_KWH_PER_ITEM: f64 = 15.0;
pub const MATERIAL_KG_PER_ITEM: f64 = 0.9;
pub const LANDFILL_M3_PER_ITEM: f64 = 0.5;
pub const TREES_PER_ITEM: f64 = 0.3;

/// Presentational estimate; every metric is `completed * constant`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactEstimate {
    pub co2_kg: f64,
    pub toxic_waste_kg: f64,
    pub energy_kwh: f64,
    pub material_recovered_kg: f64,
    pub landfill_m3: f64,
    pub trees_saved: u64,
}

impl ImpactEstimate {
    pub fn from_completed(completed: u64) -> Self {
        let count = completed as f64;
        Self {
            co2_kg: count * CO2_KG_PER_ITEM,
            toxic_waste_kg: count * TOXIC_KG_PER_ITEM,
            energy_kwh: count * ENERGY_KWH_PER_ITEM,
            material_recovered_kg: count * MATERIAL_KG_PER_ITEM,
            landfill_m3: count * LANDFILL_M3_PER_ITEM,
            trees_saved: (count * TREES_PER_ITEM).floor() as u64,
        }
    }
}
