use crate::mqtt::topics::{Channel, TopicRegistry};

use super::event::TelemetryEvent;

/// Marks text that came from the device log topic.
pub const SCALE_LOG_PREFIX: &str = "Scale log: ";

/// Classifies one inbound message against the registry.
///
/// Pure and deterministic. A weight frame that does not decode becomes a
/// [`TelemetryEvent::LogEntry`] so a single bad frame never reaches the connection
/// or the device state.
pub fn classify(registry: &TopicRegistry, topic: &str, payload: &str) -> TelemetryEvent {
    match registry.lookup(topic) {
        Some(Channel::Weight(device)) => match parse_weight(payload) {
            Some(value) => TelemetryEvent::WeightSample { device, value },
            None => TelemetryEvent::LogEntry {
                text: format!("Error parsing payload from {}: '{}'", topic, payload),
            },
        },
        Some(Channel::Status(device)) => TelemetryEvent::StatusUpdate {
            device,
            text: payload.to_string(),
        },
        Some(Channel::Log) => TelemetryEvent::LogEntry {
            text: format!("{}{}", SCALE_LOG_PREFIX, payload),
        },
        None => TelemetryEvent::UnrecognizedMessage {
            topic: topic.to_string(),
            payload: payload.to_string(),
        },
    }
}

/// Decimal kilogram reading. Surrounding whitespace is tolerated, non-finite values
/// (`NaN`, `inf`) are not weights.
pub fn parse_weight(payload: &str) -> Option<f64> {
    payload
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
