pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::bootstrap::{build_state, start};
pub use frameworks::config::PortalConfig;
pub use interface_adapters::state::AppState;
