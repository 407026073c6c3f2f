//! Command encoding
//!
//! Turns an operator request into the topic and payload a scale expects. Numeric
//! parameters are validated here, before anything is handed to the channel client,
//! so bad input surfaces as a [`ValidationError`] and never as a transport error.

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::mqtt::topics::TopicRegistry;

use super::event::DeviceId;

/// Operations a scale accepts on its command prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandOperation {
    Tare,
    AutocalibrateZero,
    AdjustReference,
    SetCalibrationFactor,
}

impl CommandOperation {
    pub const ALL: [CommandOperation; 4] = [
        CommandOperation::Tare,
        CommandOperation::AutocalibrateZero,
        CommandOperation::AdjustReference,
        CommandOperation::SetCalibrationFactor,
    ];

    /// Topic suffix appended to the device's command prefix.
    pub fn topic_suffix(self) -> &'static str {
        match self {
            CommandOperation::Tare => "tare",
            CommandOperation::AutocalibrateZero => "autocalibrar_zero",
            CommandOperation::AdjustReference => "ajustar_referencia",
            CommandOperation::SetCalibrationFactor => "set_fator_calibracao",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandOperation::Tare => "tare",
            CommandOperation::AutocalibrateZero => "autocalibrate_zero",
            CommandOperation::AdjustReference => "adjust_reference",
            CommandOperation::SetCalibrationFactor => "set_calibration_factor",
        }
    }

    /// Human label of the numeric parameter, if the operation takes one.
    pub fn parameter(self) -> Option<&'static str> {
        match self {
            CommandOperation::AdjustReference => Some("reference weight"),
            CommandOperation::SetCalibrationFactor => Some("calibration factor"),
            CommandOperation::Tare | CommandOperation::AutocalibrateZero => None,
        }
    }
}

impl fmt::Display for CommandOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CommandOperation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandOperation::ALL
            .into_iter()
            .find(|op| op.name() == s || op.topic_suffix() == s)
            .ok_or_else(|| ValidationError::UnknownOperation(s.to_string()))
    }
}

/// Rejected operator input. Nothing was published.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid number for the {field} (got '{input}')")]
    NotANumber { field: &'static str, input: String },

    #[error("The {field} must be a finite number (got '{input}')")]
    NotFinite { field: &'static str, input: String },

    #[error("Unknown scale {0}")]
    UnknownDevice(DeviceId),

    #[error("Unknown command operation '{0}'")]
    UnknownOperation(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to encode command payload: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl CommandError {
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            CommandError::Validation(e) => Some(e),
            CommandError::Encoding(_) => None,
        }
    }
}

/// Ready-to-publish command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCommand {
    pub device: DeviceId,
    pub operation: CommandOperation,
    pub topic: String,
    pub payload: String,
}

#[derive(Serialize)]
struct ReferencePayload {
    peso_referencia: f64,
}

#[derive(Serialize)]
struct CalibrationPayload {
    fator_calibracao: f64,
}

/// Writes `{"key": value, "other": value}`, the spacing the scale firmware was
/// written against.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn parse_parameter(operation: CommandOperation, input: &str) -> Result<f64, ValidationError> {
    let field = operation.parameter().unwrap_or(operation.name());
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber {
            field,
            input: input.to_string(),
        })?;
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field,
            input: input.to_string(),
        });
    }
    Ok(value)
}

#[derive(Debug, Clone)]
pub struct CommandEncoder {
    registry: Arc<TopicRegistry>,
}

impl CommandEncoder {
    pub fn new(registry: Arc<TopicRegistry>) -> Self {
        Self { registry }
    }

    /// Builds topic and payload for `operation` on `device`.
    ///
    /// `parameter` is the raw operator input; it is ignored by operations that take
    /// no value.
    pub fn encode(
        &self,
        device: DeviceId,
        operation: CommandOperation,
        parameter: &str,
    ) -> Result<EncodedCommand, CommandError> {
        let prefix = self
            .registry
            .command_prefix(device)
            .ok_or(ValidationError::UnknownDevice(device))?;

        let payload = match operation {
            CommandOperation::Tare => "1".to_string(),
            CommandOperation::AutocalibrateZero => String::new(),
            CommandOperation::AdjustReference => {
                let peso_referencia = parse_parameter(operation, parameter)?;
                to_payload(&ReferencePayload { peso_referencia })?
            }
            CommandOperation::SetCalibrationFactor => {
                let fator_calibracao = parse_parameter(operation, parameter)?;
                to_payload(&CalibrationPayload { fator_calibracao })?
            }
        };

        Ok(EncodedCommand {
            device,
            operation,
            topic: format!("{}{}", prefix, operation.topic_suffix()),
            payload,
        })
    }
}
