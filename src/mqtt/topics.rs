//! Topic registry
//!
//! Maps the logical channels of the scale network to wire-level MQTT topics.
//! Every device topic is derived from a per-device prefix:
//!
//! ```text
//! <prefix>/measurement/weight     in   decimal kg
//! <prefix>/operation/status       in   opaque text
//! <prefix>/operation/<command>    out  command payload
//! smfm/log                        in   opaque text (shared)
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use thiserror::Error;

use crate::telemetry::event::DeviceId;

pub const DEFAULT_LOG_TOPIC: &str = "smfm/log";
pub const DEFAULT_DEVICE_PREFIXES: [(u8, &str); 2] = [(1, "smfm/s01"), (2, "smfm/s02")];

const WEIGHT_SUFFIX: &str = "measurement/weight";
const STATUS_SUFFIX: &str = "operation/status";
const COMMAND_SUFFIX: &str = "operation/";

/// Logical channel a wire topic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Weight(DeviceId),
    Status(DeviceId),
    Log,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Channel::Weight(device) => write!(f, "weight-{}", device),
            Channel::Status(device) => write!(f, "status-{}", device),
            Channel::Log => write!(f, "log"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No devices configured")]
    NoDevices,

    #[error("Device {0} configured more than once")]
    DuplicateDevice(DeviceId),

    #[error("Topic '{0}' is mapped to more than one channel")]
    DuplicateTopic(String),

    #[error("Device {0} has an empty topic prefix")]
    EmptyPrefix(DeviceId),
}

/// Topics belonging to a single device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTopics {
    pub device: DeviceId,
    pub weight: String,
    pub status: String,
    pub command_prefix: String,
}

impl DeviceTopics {
    fn from_prefix(device: DeviceId, prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        Self {
            device,
            weight: format!("{}/{}", prefix, WEIGHT_SUFFIX),
            status: format!("{}/{}", prefix, STATUS_SUFFIX),
            command_prefix: format!("{}/{}", prefix, COMMAND_SUFFIX),
        }
    }
}

/// Immutable lookup table between wire topics and logical channels.
#[derive(Debug, Clone)]
pub struct TopicRegistry {
    devices: Vec<DeviceTopics>,
    inbound: HashMap<String, Channel>,
}

impl TopicRegistry {
    pub fn new<'a, I>(prefixes: I, log_topic: &str) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (DeviceId, &'a str)>,
    {
        let mut devices: Vec<DeviceTopics> = Vec::new();
        let mut inbound = HashMap::new();
        inbound.insert(log_topic.to_string(), Channel::Log);

        for (device, prefix) in prefixes {
            if prefix.trim_matches('/').is_empty() {
                return Err(RegistryError::EmptyPrefix(device));
            }
            if devices.iter().any(|d| d.device == device) {
                return Err(RegistryError::DuplicateDevice(device));
            }
            let topics = DeviceTopics::from_prefix(device, prefix);
            for (topic, channel) in [
                (&topics.weight, Channel::Weight(device)),
                (&topics.status, Channel::Status(device)),
            ] {
                if inbound.insert(topic.clone(), channel).is_some() {
                    return Err(RegistryError::DuplicateTopic(topic.clone()));
                }
            }
            if devices
                .iter()
                .any(|d| d.command_prefix == topics.command_prefix)
            {
                return Err(RegistryError::DuplicateTopic(topics.command_prefix));
            }
            devices.push(topics);
        }

        if devices.is_empty() {
            return Err(RegistryError::NoDevices);
        }

        Ok(Self {
            devices,
            inbound,
        })
    }

    /// Resolves an inbound topic. Command topics are outbound only and never match.
    pub fn lookup(&self, topic: &str) -> Option<Channel> {
        self.inbound.get(topic).copied()
    }

    /// Every topic the channel client has to subscribe to.
    pub fn subscriptions(&self) -> BTreeSet<String> {
        self.inbound.keys().cloned().collect()
    }

    pub fn command_prefix(&self, device: DeviceId) -> Option<&str> {
        self.device(device).map(|d| d.command_prefix.as_str())
    }

    pub fn device(&self, device: DeviceId) -> Option<&DeviceTopics> {
        self.devices.iter().find(|d| d.device == device)
    }

    /// Configured devices in configuration order.
    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.devices.iter().map(|d| d.device)
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        let mut devices = Vec::new();
        let mut inbound = HashMap::new();
        inbound.insert(DEFAULT_LOG_TOPIC.to_string(), Channel::Log);
        for (id, prefix) in DEFAULT_DEVICE_PREFIXES {
            let topics = DeviceTopics::from_prefix(DeviceId(id), prefix);
            inbound.insert(topics.weight.clone(), Channel::Weight(DeviceId(id)));
            inbound.insert(topics.status.clone(), Channel::Status(DeviceId(id)));
            devices.push(topics);
        }
        Self {
            devices,
            inbound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_derives_topics_from_prefixes() {
        let registry = TopicRegistry::default();

        assert_eq!(
            registry.lookup("smfm/s01/measurement/weight"),
            Some(Channel::Weight(DeviceId(1)))
        );
        assert_eq!(
            registry.lookup("smfm/s02/operation/status"),
            Some(Channel::Status(DeviceId(2)))
        );
        assert_eq!(registry.lookup("smfm/log"), Some(Channel::Log));
        assert_eq!(
            registry.command_prefix(DeviceId(1)),
            Some("smfm/s01/operation/")
        );
        assert_eq!(registry.lookup("smfm/s01/operation/tare"), None);
    }

    #[test]
    fn subscriptions_cover_every_inbound_channel() {
        let registry = TopicRegistry::default();
        let subs: Vec<String> = registry.subscriptions().into_iter().collect();

        assert_eq!(
            subs,
            vec![
                "smfm/log",
                "smfm/s01/measurement/weight",
                "smfm/s01/operation/status",
                "smfm/s02/measurement/weight",
                "smfm/s02/operation/status",
            ]
        );
    }

    #[test]
    fn explicit_construction_matches_default() {
        let registry = TopicRegistry::new(
            DEFAULT_DEVICE_PREFIXES
                .iter()
                .map(|(id, prefix)| (DeviceId(*id), *prefix)),
            DEFAULT_LOG_TOPIC,
        )
        .unwrap();

        assert_eq!(registry.subscriptions(), TopicRegistry::default().subscriptions());
        assert_eq!(registry.devices().collect::<Vec<_>>(), vec![DeviceId(1), DeviceId(2)]);
    }

    #[test]
    fn trailing_slash_in_prefix_is_ignored() {
        let registry = TopicRegistry::new([(DeviceId(7), "lab/s07/")], "lab/log").unwrap();
        assert_eq!(
            registry.device(DeviceId(7)).map(|d| d.weight.as_str()),
            Some("lab/s07/measurement/weight")
        );
    }

    #[test]
    fn rejects_ambiguous_configurations() {
        assert_eq!(
            TopicRegistry::new([(DeviceId(1), "a"), (DeviceId(1), "b")], "log").unwrap_err(),
            RegistryError::DuplicateDevice(DeviceId(1))
        );
        assert_eq!(
            TopicRegistry::new([(DeviceId(1), "a"), (DeviceId(2), "a")], "log").unwrap_err(),
            RegistryError::DuplicateTopic("a/measurement/weight".to_string())
        );
        assert_eq!(
            TopicRegistry::new(
                [(DeviceId(1), "a")],
                "a/operation/status"
            )
            .unwrap_err(),
            RegistryError::DuplicateTopic("a/operation/status".to_string())
        );
        assert_eq!(
            TopicRegistry::new(Vec::<(DeviceId, &str)>::new(), "log").unwrap_err(),
            RegistryError::NoDevices
        );
        assert_eq!(
            TopicRegistry::new([(DeviceId(3), "/")], "log").unwrap_err(),
            RegistryError::EmptyPrefix(DeviceId(3))
        );
    }

    #[test]
    fn channels_render_logical_names() {
        assert_eq!(Channel::Weight(DeviceId(1)).to_string(), "weight-01");
        assert_eq!(Channel::Status(DeviceId(2)).to_string(), "status-02");
        assert_eq!(Channel::Log.to_string(), "log");
    }
}
