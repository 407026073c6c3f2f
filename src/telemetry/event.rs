use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a monitored scale.
///
/// Rendered zero-padded (`01`, `02`) to match the device naming used on the wire
/// and in the operator's UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u8);

impl DeviceId {
    pub fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Typed result of classifying one inbound broker message.
///
/// Produced on the I/O task by the demultiplexer and consumed exactly once on the
/// presentation side.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    /// A decoded weight reading in kilograms.
    WeightSample { device: DeviceId, value: f64 },
    /// Opaque status text reported by the device.
    StatusUpdate { device: DeviceId, text: String },
    /// Free-form log text, either from the shared log topic or describing a frame
    /// that could not be decoded.
    LogEntry { text: String },
    /// A message on a topic the registry does not know. Kept verbatim.
    UnrecognizedMessage { topic: String, payload: String },
}

impl TelemetryEvent {
    /// Device the event belongs to, if any.
    pub fn device(&self) -> Option<DeviceId> {
        match self {
            TelemetryEvent::WeightSample { device, .. }
            | TelemetryEvent::StatusUpdate { device, .. } => Some(*device),
            TelemetryEvent::LogEntry { .. } | TelemetryEvent::UnrecognizedMessage { .. } => None,
        }
    }
}
