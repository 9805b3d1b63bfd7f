// Use cases layer: the portal's view-level workflows, free of transport details.

pub mod aggregation;
pub mod assistant;
pub mod certificate;
pub mod dashboard;
pub mod impact;
pub mod location;
pub mod profile;
pub mod progress;
pub mod registration;
pub mod reports;
pub mod request_actions;
pub mod role_router;
pub mod session;
pub mod view_state;
pub mod wizard;

#[cfg(test)]
mod test_support;

pub use session::{LoginOutcome, RegisterOutcome, SessionHolder};
pub use view_state::{LoadingFlag, ViewState};
