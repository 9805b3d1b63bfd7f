// Frameworks: configuration, tracing and startup wiring.

pub mod bootstrap;
pub mod config;
pub mod telemetry;
