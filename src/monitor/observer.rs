use crate::bridge::BridgeEvent;
use crate::mqtt::mqtt_handler::ConnectionState;
use crate::telemetry::{DeviceId, TelemetryEvent};

/// Outbound interface of the monitor core.
///
/// Every callback has an empty default so an observer only implements what it
/// cares about. [`MonitorObserver::observe`] is the single entry point used when
/// draining the bridge; it routes one event to exactly one callback.
pub trait MonitorObserver {
    fn on_weight_sample(&mut self, _device: DeviceId, _value: f64) {}

    fn on_status_update(&mut self, _device: DeviceId, _text: &str) {}

    fn on_log_entry(&mut self, _text: &str) {}

    fn on_connection_state_change(&mut self, _state: &ConnectionState) {}

    /// Called for every telemetry event before it is routed.
    fn on_telemetry(&mut self, _event: &TelemetryEvent) {}

    fn on_unrecognized_message(&mut self, topic: &str, payload: &str) {
        self.on_log_entry(&format!(
            "Message received: topic='{}', payload='{}'",
            topic, payload
        ));
    }

    fn on_diagnostic(&mut self, message: &str) {
        self.on_log_entry(message);
    }

    fn observe(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::Telemetry(telemetry) => {
                self.on_telemetry(&telemetry);
                match telemetry {
                    TelemetryEvent::WeightSample { device, value } => {
                        self.on_weight_sample(device, value)
                    }
                    TelemetryEvent::StatusUpdate { device, text } => {
                        self.on_status_update(device, &text)
                    }
                    TelemetryEvent::LogEntry { text } => self.on_log_entry(&text),
                    TelemetryEvent::UnrecognizedMessage { topic, payload } => {
                        self.on_unrecognized_message(&topic, &payload)
                    }
                }
            }
            BridgeEvent::ConnectionChanged(state) => self.on_connection_state_change(&state),
            BridgeEvent::Diagnostic(message) => self.on_diagnostic(&message),
        }
    }
}
