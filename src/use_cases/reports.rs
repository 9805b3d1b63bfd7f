// Client-generated CSV reports and the annual summary.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::{
    ApiError, Clock, DownloadSink, PortalApi, RecyclingRequest, RequestStatus, StorageError,
};
use crate::use_cases::aggregation::CO2_KG_PER_ITEM;

pub const CSV_HEADERS: [&str; 8] = [
    "Request ID",
    "Device",
    "Brand",
    "Model",
    "Quantity",
    "Status",
    "Date",
    "Address",
];
pub const FULL_EXPORT_FILE: &str = "Complete_Recycling_History.csv";
/// Rough average weight of one recycled item in the annual summary.
pub const SUMMARY_KG_PER_ITEM: f64 = 1.5;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No data available to export.")]
    NoData,
    #[error("Please select both Start and End dates.")]
    MissingDateRange,
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Failed to save report: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvReport {
    pub file_name: String,
    pub content: String,
}

/// Header plus one comma-joined row per record, rows separated by `\n`.
/// Refuses an empty list instead of producing a header-only file.
pub fn render_csv(records: &[RecyclingRequest]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADERS.join(","));
    for record in records {
        let date = record
            .created_at()
            .map(|at| at.format("%-m/%-d/%Y").to_string())
            .unwrap_or_default();
        let row = [
            record.id.to_string(),
            record.device_type.clone().unwrap_or_default(),
            record.brand.clone().unwrap_or_default(),
            record.model.clone().unwrap_or_default(),
            record.quantity.map(|q| q.to_string()).unwrap_or_default(),
            record.status.clone().unwrap_or_default(),
            date,
            quoted(record.pickup_address.as_deref().unwrap_or_default()),
        ];
        lines.push(row.join(","));
    }
    Ok(lines.join("\n"))
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Records created between the start of `start` and 23:59:59 of `end`.
pub fn statement(
    records: &[RecyclingRequest],
    start: &str,
    end: &str,
) -> Result<CsvReport, ExportError> {
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() {
        return Err(ExportError::MissingDateRange);
    }
    let from = parse_day(start)?.and_time(NaiveTime::MIN);
    let until = parse_day(end)?.and_time(end_of_day());

    let selected: Vec<_> = records
        .iter()
        .filter(|record| {
            record
                .created_at()
                .is_some_and(|at| at >= from && at <= until)
        })
        .cloned()
        .collect();

    Ok(CsvReport {
        file_name: format!("Recycling_Statement_{start}_to_{end}.csv"),
        content: render_csv(&selected)?,
    })
}

fn parse_day(raw: &str) -> Result<NaiveDate, ExportError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ExportError::InvalidDate(raw.to_string()))
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

fn created_in(record: &RecyclingRequest, year: i32) -> bool {
    record.created_at().is_some_and(|at| at.year() == year)
}

pub fn annual_export(records: &[RecyclingRequest], year: i32) -> Result<CsvReport, ExportError> {
    let selected: Vec<_> = records
        .iter()
        .filter(|record| created_in(record, year))
        .cloned()
        .collect();
    Ok(CsvReport {
        file_name: format!("Annual_Summary_{year}.csv"),
        content: render_csv(&selected)?,
    })
}

pub fn full_export(records: &[RecyclingRequest]) -> Result<CsvReport, ExportError> {
    Ok(CsvReport {
        file_name: FULL_EXPORT_FILE.to_string(),
        content: render_csv(records)?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnualSummary {
    pub year: i32,
    pub total_items: u64,
    pub total_weight_kg: f64,
    pub co2_saved_kg: f64,
    pub requests: usize,
    pub favorite_device: String,
}

/// Recycled (completed or collected) requests created in `year`.
pub fn annual_summary(records: &[RecyclingRequest], year: i32) -> AnnualSummary {
    let recycled: Vec<_> = records
        .iter()
        .filter(|record| created_in(record, year))
        .filter(|record| record.status().is_some_and(RequestStatus::is_recycled))
        .collect();

    let total_items: u64 = recycled.iter().map(|r| u64::from(r.item_count())).sum();

    let mut tally: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for record in &recycled {
        let device = record.device_type.as_deref().unwrap_or("Unknown");
        let count = tally.entry(device).or_insert(0);
        if *count == 0 {
            first_seen.push(device);
        }
        *count += 1;
    }
    // Ties go to the device seen first.
    let favorite_device = first_seen
        .iter()
        .copied()
        .reduce(|best, device| if tally[device] > tally[best] { device } else { best })
        .unwrap_or("N/A")
        .to_string();

    AnnualSummary {
        year,
        total_items,
        total_weight_kg: round1(total_items as f64 * SUMMARY_KG_PER_ITEM),
        co2_saved_kg: round1(total_items as f64 * CO2_KG_PER_ITEM),
        requests: recycled.len(),
        favorite_device,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// Reports view with injected dependencies.
pub struct ReportsUseCase {
    pub api: Arc<dyn PortalApi>,
    pub sink: Arc<dyn DownloadSink>,
    pub clock: Arc<dyn Clock>,
}

impl ReportsUseCase {
    pub async fn requests(&self) -> Result<Vec<RecyclingRequest>, ApiError> {
        self.api.my_requests().await
    }

    pub fn current_year(&self) -> i32 {
        self.now().year()
    }

    pub fn summary(&self, records: &[RecyclingRequest]) -> AnnualSummary {
        annual_summary(records, self.current_year())
    }

    pub fn annual_export(&self, records: &[RecyclingRequest]) -> Result<CsvReport, ExportError> {
        annual_export(records, self.current_year())
    }

    /// Hands a rendered report to the download sink.
    pub fn save(&self, report: &CsvReport) -> Result<PathBuf, ExportError> {
        let path = self
            .sink
            .save(&report.file_name, report.content.as_bytes())?;
        tracing::info!(file = %report.file_name, "report exported.");
        Ok(path)
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }
}
