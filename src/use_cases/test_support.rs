use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{
    ApiError, Clock, DownloadSink, Identity, KeyValueStore, LoginRequest, LoginResponse,
    PickupPerson, PortalApi, ProfileUpdateRequest, RecyclingRequest, RegistrationRequest,
    RequestSubmission, ScheduleRequest, StatusCount, StatusUpdateRequest, StorageError,
};

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) NaiveDateTime);

impl FixedClock {
    pub(crate) fn at(year: i32, month: u32, day: u32, hour: u32) -> Self {
        let now = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .expect("valid fixed clock");
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub(crate) fn identity(name: &str, role: &str) -> Identity {
    Identity {
        id: Some(1),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role: Some(role.to_string()),
        ..Identity::default()
    }
}

pub(crate) fn record(id: i64, status: &str, created_at: &str) -> RecyclingRequest {
    RecyclingRequest {
        id,
        device_type: Some("LAPTOP".to_string()),
        brand: Some("Dell".to_string()),
        model: Some("XPS 13".to_string()),
        quantity: Some(1),
        pickup_address: Some("12 Green Lane".to_string()),
        status: Some(status.to_string()),
        created_at: Some(created_at.to_string()),
        ..RecyclingRequest::default()
    }
}

// Every endpoint answers with a canned result and records what it was sent.
pub(crate) struct FakeApi {
    pub(crate) bearer: Mutex<Option<String>>,
    pub(crate) calls: Mutex<Vec<&'static str>>,
    pub(crate) logins: Mutex<Vec<LoginRequest>>,
    pub(crate) submissions: Mutex<Vec<RequestSubmission>>,
    pub(crate) status_updates: Mutex<Vec<(i64, StatusUpdateRequest)>>,
    pub(crate) schedules: Mutex<Vec<(i64, ScheduleRequest)>>,
    pub(crate) profiles: Mutex<Vec<ProfileUpdateRequest>>,
    pub(crate) login: Mutex<Result<LoginResponse, ApiError>>,
    pub(crate) register: Mutex<Result<(), ApiError>>,
    pub(crate) my_requests: Mutex<Result<Vec<RecyclingRequest>, ApiError>>,
    pub(crate) submit: Mutex<Result<(), ApiError>>,
    pub(crate) all_requests: Mutex<Result<Vec<RecyclingRequest>, ApiError>>,
    pub(crate) pickup_persons: Mutex<Result<Vec<PickupPerson>, ApiError>>,
    pub(crate) assigned: Mutex<Result<Vec<RecyclingRequest>, ApiError>>,
    pub(crate) status_update: Mutex<Result<(), ApiError>>,
    pub(crate) schedule: Mutex<Result<(), ApiError>>,
    pub(crate) status_counts: Mutex<Result<Vec<StatusCount>, ApiError>>,
    pub(crate) certificate: Mutex<Result<Vec<u8>, ApiError>>,
    pub(crate) profile: Mutex<Result<(), ApiError>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            bearer: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            logins: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            status_updates: Mutex::new(Vec::new()),
            schedules: Mutex::new(Vec::new()),
            profiles: Mutex::new(Vec::new()),
            login: Mutex::new(Err(ApiError::Unauthorized)),
            register: Mutex::new(Ok(())),
            my_requests: Mutex::new(Ok(Vec::new())),
            submit: Mutex::new(Ok(())),
            all_requests: Mutex::new(Ok(Vec::new())),
            pickup_persons: Mutex::new(Ok(Vec::new())),
            assigned: Mutex::new(Ok(Vec::new())),
            status_update: Mutex::new(Ok(())),
            schedule: Mutex::new(Ok(())),
            status_counts: Mutex::new(Ok(Vec::new())),
            certificate: Mutex::new(Ok(Vec::new())),
            profile: Mutex::new(Ok(())),
        }
    }
}

impl FakeApi {
    pub(crate) fn accepting_login(token: &str, user: Identity) -> Self {
        let api = Self::default();
        *api.login.lock().expect("login mutex poisoned") = Ok(LoginResponse {
            access_token: Some(token.to_string()),
            user: Some(user),
        });
        api
    }

    pub(crate) fn set<T>(slot: &Mutex<T>, value: T) {
        *slot.lock().expect("fake api mutex poisoned") = value;
    }

    pub(crate) fn bearer(&self) -> Option<String> {
        self.bearer.lock().expect("bearer mutex poisoned").clone()
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }

    fn answer<T: Clone>(slot: &Mutex<Result<T, ApiError>>) -> Result<T, ApiError> {
        slot.lock().expect("fake api mutex poisoned").clone()
    }
}

#[async_trait]
impl PortalApi for FakeApi {
    fn set_bearer(&self, token: Option<String>) {
        *self.bearer.lock().expect("bearer mutex poisoned") = token;
    }

    async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ApiError> {
        self.record("login");
        self.logins.lock().expect("logins mutex poisoned").push(req);
        Self::answer(&self.login)
    }

    async fn register(&self, _req: RegistrationRequest) -> Result<(), ApiError> {
        self.record("register");
        Self::answer(&self.register)
    }

    async fn my_requests(&self) -> Result<Vec<RecyclingRequest>, ApiError> {
        self.record("my_requests");
        Self::answer(&self.my_requests)
    }

    async fn submit_request(&self, submission: RequestSubmission) -> Result<(), ApiError> {
        self.record("submit_request");
        self.submissions
            .lock()
            .expect("submissions mutex poisoned")
            .push(submission);
        Self::answer(&self.submit)
    }

    async fn all_requests(&self) -> Result<Vec<RecyclingRequest>, ApiError> {
        self.record("all_requests");
        Self::answer(&self.all_requests)
    }

    async fn pickup_persons(&self) -> Result<Vec<PickupPerson>, ApiError> {
        self.record("pickup_persons");
        Self::answer(&self.pickup_persons)
    }

    async fn assigned_requests(&self) -> Result<Vec<RecyclingRequest>, ApiError> {
        self.record("assigned_requests");
        Self::answer(&self.assigned)
    }

    async fn update_request_status(
        &self,
        request_id: i64,
        update: StatusUpdateRequest,
    ) -> Result<(), ApiError> {
        self.record("update_request_status");
        self.status_updates
            .lock()
            .expect("status updates mutex poisoned")
            .push((request_id, update));
        Self::answer(&self.status_update)
    }

    async fn schedule_pickup(
        &self,
        request_id: i64,
        schedule: ScheduleRequest,
    ) -> Result<(), ApiError> {
        self.record("schedule_pickup");
        self.schedules
            .lock()
            .expect("schedules mutex poisoned")
            .push((request_id, schedule));
        Self::answer(&self.schedule)
    }

    async fn my_status_counts(&self) -> Result<Vec<StatusCount>, ApiError> {
        self.record("my_status_counts");
        Self::answer(&self.status_counts)
    }

    async fn certificate_pdf(&self) -> Result<Vec<u8>, ApiError> {
        self.record("certificate_pdf");
        Self::answer(&self.certificate)
    }

    async fn update_profile(&self, req: ProfileUpdateRequest) -> Result<(), ApiError> {
        self.record("update_profile");
        self.profiles.lock().expect("profiles mutex poisoned").push(req);
        Self::answer(&self.profile)
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub(crate) fn seeded(entries: &[(&str, &str)]) -> Self {
        let map = entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    pub(crate) fn snapshot(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("entries mutex poisoned")
            .get(key)
            .cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.snapshot(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .expect("entries mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .expect("entries mutex poisoned")
            .remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingSink {
    pub(crate) fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.files.lock().expect("files mutex poisoned").clone()
    }
}

impl DownloadSink for RecordingSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        self.files
            .lock()
            .expect("files mutex poisoned")
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}
