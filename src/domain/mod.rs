mod api;
mod errors;
mod identity;
mod ports;
mod request;
mod routes;

// Re-export the domain boundary types and ports.
pub use api::{
    ImageFile, ImageSlot, LoginRequest, LoginResponse, PortalApi, ProfileUpdateRequest,
    RegistrationRequest, RequestSubmission, ScheduleRequest, StatusUpdateRequest,
};
pub use errors::{ApiError, GeolocationError, StorageError};
pub use identity::{Identity, IdentityUpdate, Role, Session};
pub use ports::{Clock, Coordinates, DownloadSink, Geolocator, KeyValueStore, ReverseGeocoder};
pub use request::{
    Condition, DeviceType, PickupPerson, RecyclingRequest, RequestStatus, StatusCount,
    UnknownStatus, parse_timestamp,
};
pub use routes::{Audience, Route};
