//! Telemetry domain
//!
//! Typed events decoded from the scale network, the bounded plot series they feed
//! and the encoder for commands travelling the other way.
//!
//! ```text
//! (topic, payload) ──► demux::classify ──► TelemetryEvent ──► SeriesBuffer
//! operator input   ──► CommandEncoder  ──► (topic, payload)
//! ```

pub mod command;
pub mod demux;
pub mod event;
pub mod series;

pub use command::{CommandEncoder, CommandError, CommandOperation, EncodedCommand, ValidationError};
pub use demux::classify;
pub use event::{DeviceId, TelemetryEvent};
pub use series::{Sample, SampleSeries, SeriesBuffer};
