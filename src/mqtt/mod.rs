//! # MQTT
//!
//! Broker-facing side of the monitor.
//!
//! ```text
//! mqtt/
//! ├── config.rs        - connection parameters and reconnect backoff
//! ├── mqtt_handler.rs  - connection state machine, publish gating, shutdown
//! └── topics.rs        - topic registry for the configured scales
//! ```
//!
//! Inbound messages are classified on the client task and leave this module as
//! [`crate::bridge::BridgeEvent`]s. Outbound commands enter through
//! [`mqtt_handler::MqttPublisher`].

pub mod config;
pub mod mqtt_handler;
pub mod topics;
