use std::sync::Arc;

use chrono::Datelike;

use crate::domain::{ApiError, Clock, DeviceType, PortalApi, RecyclingRequest, RequestStatus};
use crate::use_cases::aggregation::{CO2_KG_PER_ITEM, ENERGY_KWH_PER_ITEM, MONTHS};

pub const WATER_LITRES_PER_KG: f64 = 20.0;

/// Typical weight of one device, in kilograms.
pub fn device_weight_kg(device: DeviceType) -> f64 {
    match device {
        DeviceType::Laptop => 2.5,
        DeviceType::Desktop => 10.0,
        DeviceType::Monitor => 5.0,
        DeviceType::Printer => 8.0,
        DeviceType::Tv => 15.0,
        DeviceType::Mobile => 0.2,
        DeviceType::Tablet => 0.5,
        DeviceType::Camera => 0.5,
        DeviceType::Headphones => 0.3,
        DeviceType::Other => 1.5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactMonth {
    pub month: &'static str,
    pub items: u64,
    pub co2_kg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub name: &'static str,
    pub description: &'static str,
    pub earned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunityRank {
    pub title: &'static str,
    pub percentile: u8,
}

impl CommunityRank {
    pub fn for_items(items: u64) -> Self {
        let (title, percentile) = match items {
            51.. => ("Elite Recycler", 99),
            21..=50 => ("Eco Champion", 90),
            11..=20 => ("Green Advocate", 75),
            1..=10 => ("Contributor", 50),
            0 => ("Novice", 0),
        };
        Self { title, percentile }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImpactReport {
    pub total_items: u64,
    pub total_weight_kg: f64,
    pub co2_saved_kg: f64,
    pub energy_saved_kwh: f64,
    pub water_saved_litres: f64,
    /// January through the current month of the current year.
    pub history: Vec<ImpactMonth>,
    pub badges: [Badge; 4],
    pub rank: CommunityRank,
}

/// Personal impact over the caller's completed or collected requests.
pub fn impact_report(requests: &[RecyclingRequest], clock: &dyn Clock) -> ImpactReport {
    let now = clock.now();
    let recycled: Vec<_> = requests
        .iter()
        .filter(|request| request.status().is_some_and(RequestStatus::is_recycled))
        .collect();

    let mut total_items = 0u64;
    let mut total_weight_kg = 0.0;
    for request in &recycled {
        let quantity = u64::from(request.item_count());
        total_items += quantity;
        total_weight_kg +=
            quantity as f64 * device_weight_kg(DeviceType::from_raw(request.device_type.as_deref()));
    }
    let co2_saved_kg = total_items as f64 * CO2_KG_PER_ITEM;

    let mut history: Vec<ImpactMonth> = MONTHS[..=now.month0() as usize]
        .iter()
        .map(|&month| ImpactMonth {
            month,
            items: 0,
            co2_kg: 0.0,
        })
        .collect();
    for request in &recycled {
        let Some(created) = request.created_at() else {
            continue;
        };
        if created.year() != now.year() {
            continue;
        }
        if let Some(bucket) = history.get_mut(created.month0() as usize) {
            let quantity = u64::from(request.item_count());
            bucket.items += quantity;
            bucket.co2_kg += quantity as f64 * CO2_KG_PER_ITEM;
        }
    }

    let badges = [
        Badge {
            name: "First Recycler",
            description: "Recycled your first device",
            earned: total_items >= 1,
        },
        Badge {
            name: "Eco Warrior",
            description: "Recycled 10+ items",
            earned: total_items >= 10,
        },
        Badge {
            name: "Heavy Lifter",
            description: "Recycled 50kg+ total",
            earned: total_weight_kg >= 50.0,
        },
        Badge {
            name: "Super Saver",
            description: "Saved over 100kg of CO₂",
            earned: co2_saved_kg >= 100.0,
        },
    ];

    ImpactReport {
        total_items,
        total_weight_kg,
        co2_saved_kg,
        energy_saved_kwh: total_items as f64 * ENERGY_KWH_PER_ITEM,
        water_saved_litres: total_weight_kg * WATER_LITRES_PER_KG,
        history,
        badges,
        rank: CommunityRank::for_items(total_items),
    }
}

pub struct ImpactUseCase {
    pub api: Arc<dyn PortalApi>,
    pub clock: Arc<dyn Clock>,
}

impl ImpactUseCase {
    pub async fn load(&self) -> Result<ImpactReport, ApiError> {
        let requests = self.api.my_requests().await?;
        Ok(impact_report(&requests, self.clock.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{FakeApi, FixedClock, record};

    #[test]
    fn when_requests_are_recycled_then_weight_uses_device_table() {
        let clock = FixedClock::at(2025, 4, 20, 12);
        let mut tvs = record(1, "COMPLETED", "2025-02-11");
        tvs.device_type = Some("tv".to_string());
        tvs.quantity = Some(2);
        let laptop = record(2, "COLLECTED", "2025-04-02");
        let mut toaster = record(3, "COMPLETED", "2024-12-30");
        toaster.device_type = Some("TOASTER".to_string());
        let pending = record(4, "PENDING", "2025-03-01");

        let report = impact_report(&[tvs, laptop, toaster, pending], &clock);

        assert_eq!(report.total_items, 4);
        assert_eq!(report.total_weight_kg, 34.0);
        assert_eq!(report.co2_saved_kg, 10.0);
        assert_eq!(report.energy_saved_kwh, 60.0);
        assert_eq!(report.water_saved_litres, 680.0);
        assert_eq!(report.rank, CommunityRank { title: "Contributor", percentile: 50 });
    }

    #[test]
    fn when_building_history_then_it_runs_from_january_to_this_month_for_this_year_only() {
        let clock = FixedClock::at(2025, 4, 20, 12);
        let records = vec![
            record(1, "COMPLETED", "2025-02-11"),
            record(2, "COMPLETED", "2024-02-11"),
        ];

        let report = impact_report(&records, &clock);

        let months: Vec<_> = report.history.iter().map(|m| m.month).collect();
        assert_eq!(months, ["Jan", "Feb", "Mar", "Apr"]);
        assert_eq!(report.history[1].items, 1);
        assert_eq!(report.history[1].co2_kg, 2.5);
    }

    #[test]
    fn when_thresholds_are_crossed_then_badges_are_earned() {
        let clock = FixedClock::at(2025, 12, 1, 12);
        let mut desktops = record(1, "COMPLETED", "2025-06-01");
        desktops.device_type = Some("DESKTOP".to_string());
        desktops.quantity = Some(10);

        let report = impact_report(&[desktops], &clock);

        let earned: Vec<_> = report.badges.iter().map(|b| b.earned).collect();
        assert_eq!(earned, [true, true, true, false]);
        assert_eq!(report.rank.title, "Contributor");
    }

    #[test]
    fn when_item_count_grows_then_rank_climbs_at_the_boundaries() {
        assert_eq!(CommunityRank::for_items(0).title, "Novice");
        assert_eq!(CommunityRank::for_items(10).title, "Contributor");
        assert_eq!(CommunityRank::for_items(11).title, "Green Advocate");
        assert_eq!(CommunityRank::for_items(21).title, "Eco Champion");
        assert_eq!(CommunityRank::for_items(51).percentile, 99);
    }

    #[tokio::test]
    async fn when_loading_then_report_is_built_from_own_requests() {
        let api = Arc::new(FakeApi::default());
        FakeApi::set(&api.my_requests, Ok(vec![record(1, "COMPLETED", "2025-01-05")]));
        let use_case = ImpactUseCase {
            api: api.clone(),
            clock: Arc::new(FixedClock::at(2025, 1, 31, 8)),
        };

        let report = use_case.load().await.expect("expected report");

        assert_eq!(report.total_items, 1);
        assert_eq!(api.calls(), vec!["my_requests"]);
    }
}
