// Interface adapters: HTTP clients, wire formats and host-side storage.

pub mod clients;
pub mod device;
pub mod downloads;
pub mod protocol;
pub mod state;
pub mod storage;
