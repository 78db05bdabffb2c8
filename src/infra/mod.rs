pub mod error;
pub mod http;
pub mod snapshots;
pub mod telemetry;
