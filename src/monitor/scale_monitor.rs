use tracing::{info, warn};

use super::model::MonitorModel;
use crate::bridge::BridgeReceiver;
use crate::mqtt::mqtt_handler::{ClientError, MqttPublisher};
use crate::telemetry::{CommandEncoder, CommandError, CommandOperation, DeviceId, EncodedCommand};

/// Accepted command, as it was handed to the channel client.
pub type Ack = EncodedCommand;

/// Outbound side of the channel client as seen by the monitor.
pub trait CommandPublisher {
    fn publish(&self, topic: String, payload: String) -> Result<(), ClientError>;
}

impl CommandPublisher for MqttPublisher {
    fn publish(&self, topic: String, payload: String) -> Result<(), ClientError> {
        MqttPublisher::publish(self, topic, payload)
    }
}

/// Presentation-side facade: owns the model and turns operator requests into
/// publishes.
pub struct ScaleMonitor {
    model: MonitorModel,
    encoder: CommandEncoder,
    publisher: Box<dyn CommandPublisher>,
}

impl ScaleMonitor {
    pub fn new(
        model: MonitorModel,
        encoder: CommandEncoder,
        publisher: impl CommandPublisher + 'static,
    ) -> Self {
        Self {
            model,
            encoder,
            publisher: Box::new(publisher),
        }
    }

    pub fn model(&self) -> &MonitorModel {
        &self.model
    }

    /// Applies everything the I/O side queued since the last call.
    pub fn ingest(&mut self, bridge: &mut BridgeReceiver) -> usize {
        bridge.drain_into(&mut self.model)
    }

    /// Validates, encodes and hands a command to the channel client.
    ///
    /// Validation failures return before anything is published. Once accepted the
    /// command is fire-and-forget: a publish the client cannot perform is reported
    /// in the log, not here.
    pub fn request_command(
        &mut self,
        device: DeviceId,
        operation: CommandOperation,
        parameter: &str,
    ) -> Result<Ack, CommandError> {
        let command = self.encoder.encode(device, operation, parameter)?;

        if let Err(e) = self
            .publisher
            .publish(command.topic.clone(), command.payload.clone())
        {
            warn!("Command {} for scale {} not queued: {}", operation, device, e);
            self.model
                .push_log(format!("Cannot publish, MQTT client not running ({}).", e));
            return Ok(command);
        }

        let label = self
            .model
            .device(device)
            .map(|d| d.label.clone())
            .unwrap_or_else(|| format!("Scale {}", device));
        let payload = if command.payload.is_empty() {
            "N/A"
        } else {
            command.payload.as_str()
        };
        let line = format!(
            "Command '{}' sent to {}. Topic: {}, Payload: {}",
            operation.topic_suffix(),
            label,
            command.topic,
            payload
        );
        info!("{}", line);
        self.model.push_log(line);
        self.model.note_command();

        Ok(command)
    }
}
