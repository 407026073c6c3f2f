use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};
use tracing::debug;

use super::observer::MonitorObserver;
use crate::mqtt::mqtt_handler::ConnectionState;
use crate::telemetry::{DeviceId, SeriesBuffer, TelemetryEvent};

pub const DEFAULT_LOG_LINES: usize = 500;

/// Last known state of one scale.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub id: DeviceId,
    pub label: String,
    pub weight: Option<f64>,
    pub status: String,
}

impl DeviceState {
    fn new(id: DeviceId, label: String) -> Self {
        Self {
            id,
            label,
            weight: None,
            status: "Disconnected".to_string(),
        }
    }

    pub fn weight_text(&self) -> String {
        format!("{:.3} kg", self.weight.unwrap_or(0.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub timestamp: DateTime<Local>,
    pub text: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelStats {
    pub messages_received: u64,
    pub weight_samples: u64,
    pub commands_requested: u64,
    pub last_activity: Option<DateTime<Local>>,
}

/// Business state of the monitor, fed exclusively through [`MonitorObserver`].
///
/// Lives on the presentation thread; nothing here is shared.
#[derive(Debug)]
pub struct MonitorModel {
    devices: Vec<DeviceState>,
    series: SeriesBuffer,
    connection: ConnectionState,
    log: VecDeque<LogLine>,
    log_capacity: usize,
    stats: ChannelStats,
}

impl MonitorModel {
    pub fn new<I>(devices: I, plot_capacity: usize, log_capacity: usize) -> Self
    where
        I: IntoIterator<Item = (DeviceId, String)>,
    {
        let devices: Vec<DeviceState> = devices
            .into_iter()
            .map(|(id, label)| DeviceState::new(id, label))
            .collect();
        let series = SeriesBuffer::new(devices.iter().map(|d| d.id), plot_capacity);

        Self {
            devices,
            series,
            connection: ConnectionState::default(),
            log: VecDeque::with_capacity(log_capacity.min(DEFAULT_LOG_LINES)),
            log_capacity,
            stats: ChannelStats::default(),
        }
    }

    pub fn devices(&self) -> &[DeviceState] {
        &self.devices
    }

    pub fn device(&self, id: DeviceId) -> Option<&DeviceState> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn series(&self) -> &SeriesBuffer {
        &self.series
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn log(&self) -> impl Iterator<Item = &LogLine> {
        self.log.iter()
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    pub fn push_log(&mut self, text: impl Into<String>) {
        if self.log_capacity == 0 {
            return;
        }
        while self.log.len() >= self.log_capacity {
            self.log.pop_front();
        }
        self.log.push_back(LogLine {
            timestamp: Local::now(),
            text: text.into(),
        });
    }

    pub(crate) fn note_command(&mut self) {
        self.stats.commands_requested += 1;
        self.stats.last_activity = Some(Local::now());
    }

    fn device_mut(&mut self, id: DeviceId) -> Option<&mut DeviceState> {
        self.devices.iter_mut().find(|d| d.id == id)
    }
}

impl MonitorObserver for MonitorModel {
    fn on_telemetry(&mut self, _event: &TelemetryEvent) {
        self.stats.messages_received += 1;
        self.stats.last_activity = Some(Local::now());
    }

    fn on_weight_sample(&mut self, device: DeviceId, value: f64) {
        // the shared index advances even for a device without a panel
        let index = self.series.record(device, value);
        self.stats.weight_samples += 1;
        match self.device_mut(device) {
            Some(state) => state.weight = Some(value),
            None => debug!("Weight {} for unconfigured scale {} (sample {})", value, device, index),
        }
    }

    fn on_status_update(&mut self, device: DeviceId, text: &str) {
        if let Some(state) = self.device_mut(device) {
            state.status = text.to_string();
        }
    }

    fn on_log_entry(&mut self, text: &str) {
        self.push_log(text);
    }

    fn on_connection_state_change(&mut self, state: &ConnectionState) {
        self.connection = state.clone();
    }
}
