//! Monitor core
//!
//! Presentation-side business state. Events drained from the bridge are routed
//! through [`MonitorObserver`] into the [`MonitorModel`]; operator requests go the
//! other way through [`ScaleMonitor::request_command`].
//!
//! The egui shell only reads the model and calls `request_command`. It holds no
//! telemetry state of its own.

pub mod model;
pub mod observer;
pub mod scale_monitor;

pub use model::{ChannelStats, DeviceState, LogLine, MonitorModel};
pub use observer::MonitorObserver;
pub use scale_monitor::{Ack, CommandPublisher, ScaleMonitor};
