use std::sync::Arc;

use crate::domain::{Clock, DownloadSink, Geolocator, PortalApi, ReverseGeocoder};
use crate::use_cases::certificate::CertificateUseCase;
use crate::use_cases::dashboard::DashboardUseCase;
use crate::use_cases::impact::ImpactUseCase;
use crate::use_cases::location::LocationAssist;
use crate::use_cases::profile::ProfileUseCase;
use crate::use_cases::progress::ProgressUseCase;
use crate::use_cases::reports::ReportsUseCase;
use crate::use_cases::request_actions::RequestActionsUseCase;
use crate::use_cases::session::SessionHolder;
use crate::use_cases::wizard::SubmitRequestUseCase;

#[derive(Clone)]
pub struct AppState {
    // We use Arc<dyn Trait> to hold any implementation (dependency injection).
    pub api: Arc<dyn PortalApi>,
    // Single owner of the token and identity; every view reads through it.
    pub session: Arc<SessionHolder>,
    pub geolocator: Arc<dyn Geolocator>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub downloads: Arc<dyn DownloadSink>,
    pub clock: Arc<dyn Clock>,
}

// Each view builds its use case from the shared handles.
impl AppState {
    pub fn dashboard(&self) -> DashboardUseCase {
        DashboardUseCase {
            api: self.api.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn submit_request(&self) -> SubmitRequestUseCase {
        SubmitRequestUseCase {
            api: self.api.clone(),
            session: self.session.clone(),
        }
    }

    pub fn location(&self) -> LocationAssist<Arc<dyn Geolocator>, Arc<dyn ReverseGeocoder>> {
        LocationAssist {
            geolocator: self.geolocator.clone(),
            geocoder: self.geocoder.clone(),
        }
    }

    pub fn progress(&self) -> ProgressUseCase {
        ProgressUseCase {
            api: self.api.clone(),
        }
    }

    pub fn impact(&self) -> ImpactUseCase {
        ImpactUseCase {
            api: self.api.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn reports(&self) -> ReportsUseCase {
        ReportsUseCase {
            api: self.api.clone(),
            sink: self.downloads.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn certificate(&self) -> CertificateUseCase {
        CertificateUseCase {
            api: self.api.clone(),
            sink: self.downloads.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn profile(&self) -> ProfileUseCase {
        ProfileUseCase {
            api: self.api.clone(),
            session: self.session.clone(),
        }
    }

    pub fn request_actions(&self) -> RequestActionsUseCase {
        RequestActionsUseCase {
            api: self.api.clone(),
        }
    }
}
