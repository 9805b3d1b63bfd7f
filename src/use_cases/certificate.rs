// Appreciation certificate: advisory local eligibility, backend-generated PDF.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::{
    ApiError, Clock, DownloadSink, Identity, PortalApi, RequestStatus, Route, StatusCount,
};
use crate::use_cases::aggregation::ImpactEstimate;
use crate::use_cases::view_state::SESSION_EXPIRED;

/// Recycled requests needed before the certificate unlocks.
pub const CERTIFICATE_THRESHOLD: u64 = 10;
pub const DOWNLOAD_FAILED: &str = "Could not download certificate. Please ensure you have 10+ Completed or Collected requests.";

/// Completed plus collected, read from the per-status stats rows.
pub fn recycled_count(stats: &[StatusCount]) -> u64 {
    stats
        .iter()
        .filter(|row| {
            row.status
                .parse::<RequestStatus>()
                .is_ok_and(RequestStatus::is_recycled)
        })
        .map(|row| row.count)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eligibility {
    pub recycled: u64,
}

impl Eligibility {
    /// Only decides whether the action is offered; the backend has the final say.
    pub fn is_eligible(self) -> bool {
        self.recycled >= CERTIFICATE_THRESHOLD
    }

    pub fn remaining(self) -> u64 {
        CERTIFICATE_THRESHOLD.saturating_sub(self.recycled)
    }

    pub fn progress_percent(self) -> u64 {
        (self.recycled * 100 / CERTIFICATE_THRESHOLD).min(100)
    }

    pub fn impact(self) -> ImpactEstimate {
        ImpactEstimate::from_completed(self.recycled)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificatePreview {
    pub number: String,
    pub issued_on: NaiveDate,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CertificateDownload {
    Saved(PathBuf),
    SessionExpired { redirect: Route },
    Failed(String),
}

impl CertificateDownload {
    pub fn message(&self) -> Option<&str> {
        match self {
            CertificateDownload::Saved(_) => None,
            CertificateDownload::SessionExpired { .. } => Some(SESSION_EXPIRED),
            CertificateDownload::Failed(message) => Some(message),
        }
    }
}

pub fn certificate_file_name(identity: Option<&Identity>) -> String {
    let name = identity
        .map(|identity| identity.name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or("Award");
    format!("EcoWaste-Certificate-{name}.pdf")
}

// Certificate view with injected dependencies.
pub struct CertificateUseCase {
    pub api: Arc<dyn PortalApi>,
    pub sink: Arc<dyn DownloadSink>,
    pub clock: Arc<dyn Clock>,
}

impl CertificateUseCase {
    pub async fn eligibility(&self) -> Result<Eligibility, ApiError> {
        let stats = self.api.my_status_counts().await?;
        Ok(Eligibility {
            recycled: recycled_count(&stats),
        })
    }

    /// Preview card shown once the local check passes.
    pub fn preview(
        &self,
        eligibility: Eligibility,
        identity: Option<&Identity>,
    ) -> Option<CertificatePreview> {
        if !eligibility.is_eligible() {
            return None;
        }
        let now = self.clock.now();
        let stamp = now.and_utc().timestamp_millis().rem_euclid(1_000_000);
        let recipient = identity
            .map(|identity| identity.name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or("Valued User")
            .to_string();

        Some(CertificatePreview {
            number: format!("EWC-{stamp:06}"),
            issued_on: now.date(),
            recipient,
        })
    }

    /// Always asks the backend, whatever the local count says.
    #[tracing::instrument(name = "download_certificate", skip_all)]
    pub async fn download(&self, identity: Option<&Identity>) -> CertificateDownload {
        let bytes = match self.api.certificate_pdf().await {
            Ok(bytes) => bytes,
            Err(ApiError::Unauthorized) => {
                return CertificateDownload::SessionExpired {
                    redirect: Route::Login,
                };
            }
            Err(err) => {
                tracing::warn!(error = %err, "certificate generation refused.");
                return CertificateDownload::Failed(DOWNLOAD_FAILED.to_string());
            }
        };

        match self.sink.save(&certificate_file_name(identity), &bytes) {
            Ok(path) => {
                tracing::info!(path = %path.display(), size = bytes.len(), "certificate saved.");
                CertificateDownload::Saved(path)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to save certificate.");
                CertificateDownload::Failed(DOWNLOAD_FAILED.to_string())
            }
        }
    }
}
