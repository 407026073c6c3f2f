pub mod bridge;
pub mod config;
pub mod monitor;
pub mod mqtt;
pub mod telemetry;
pub mod ui;
