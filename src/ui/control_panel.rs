use eframe::egui::{self, Id, Modal, TextEdit, Ui};
use tracing::warn;

use super::common::{create_frame, UiColors};
use crate::monitor::ScaleMonitor;
use crate::telemetry::{CommandOperation, DeviceId};

/// "Reference weight:" style caption for an operation's input field.
pub fn field_label(operation: CommandOperation) -> String {
    let name = operation.parameter().unwrap_or(operation.name());
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{}:", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Operator inputs for sending commands to the selected scale.
pub struct ControlPanel {
    selected: DeviceId,
    reference_input: String,
    factor_input: String,
    error: Option<String>,
}

impl ControlPanel {
    pub fn new(selected: DeviceId) -> Self {
        Self {
            selected,
            reference_input: String::new(),
            factor_input: String::new(),
            error: None,
        }
    }

    pub fn selected(&self) -> DeviceId {
        self.selected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sends `operation` with the matching text field as its parameter.
    ///
    /// A rejected input is kept for the validation dialog; returns whether the
    /// command was accepted.
    pub fn submit(&mut self, monitor: &mut ScaleMonitor, operation: CommandOperation) -> bool {
        let parameter = match operation {
            CommandOperation::AdjustReference => self.reference_input.as_str(),
            CommandOperation::SetCalibrationFactor => self.factor_input.as_str(),
            CommandOperation::Tare | CommandOperation::AutocalibrateZero => "",
        };

        match monitor.request_command(self.selected, operation, parameter) {
            Ok(_) => true,
            Err(e) => {
                warn!("Rejected {} for scale {}: {}", operation, self.selected, e);
                self.error = Some(e.to_string());
                false
            }
        }
    }

    pub fn render(&mut self, ui: &mut Ui, monitor: &mut ScaleMonitor) {
        let devices: Vec<(DeviceId, String)> = monitor
            .model()
            .devices()
            .iter()
            .map(|d| (d.id, d.label.clone()))
            .collect();

        create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
            ui.heading("Scale Control");

            ui.horizontal(|ui| {
                ui.label("Select scale:");
                for (id, label) in &devices {
                    ui.radio_value(&mut self.selected, *id, label.as_str());
                }
            });

            ui.horizontal(|ui| {
                if ui.button("Tare").clicked() {
                    self.submit(monitor, CommandOperation::Tare);
                }
                if ui.button("Autocalibrate zero").clicked() {
                    self.submit(monitor, CommandOperation::AutocalibrateZero);
                }
            });

            egui::Grid::new("command_inputs")
                .num_columns(3)
                .spacing([8.0, 4.0])
                .show(ui, |ui| {
                    ui.label(field_label(CommandOperation::AdjustReference));
                    ui.add(
                        TextEdit::singleline(&mut self.reference_input)
                            .hint_text("e.g. 1.000")
                            .desired_width(120.0),
                    );
                    if ui.button("Adjust with reference").clicked() {
                        self.submit(monitor, CommandOperation::AdjustReference);
                    }
                    ui.end_row();

                    ui.label(field_label(CommandOperation::SetCalibrationFactor));
                    ui.add(
                        TextEdit::singleline(&mut self.factor_input)
                            .hint_text("e.g. 2280.0")
                            .desired_width(120.0),
                    );
                    if ui.button("Set calibration factor").clicked() {
                        self.submit(monitor, CommandOperation::SetCalibrationFactor);
                    }
                    ui.end_row();
                });
        });

        self.validation_dialog(ui);
    }

    fn validation_dialog(&mut self, ui: &mut Ui) {
        let Some(message) = self.error.as_deref() else {
            return;
        };

        let mut dismissed = false;
        let response = Modal::new(Id::new("command_validation")).show(ui.ctx(), |ui| {
            ui.set_width(260.0);
            ui.heading("Input Error");
            ui.label(message);
            ui.separator();
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

        if dismissed || response.should_close() {
            self.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{CommandPublisher, MonitorModel};
    use crate::mqtt::mqtt_handler::ClientError;
    use crate::mqtt::topics::TopicRegistry;
    use crate::telemetry::CommandEncoder;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Counting(Rc<Cell<usize>>);

    impl CommandPublisher for Counting {
        fn publish(&self, _topic: String, _payload: String) -> Result<(), ClientError> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    fn monitor(publisher: Counting) -> ScaleMonitor {
        let registry = Arc::new(TopicRegistry::default());
        let model = MonitorModel::new(
            [
                (DeviceId(1), "Scale 01".to_string()),
                (DeviceId(2), "Scale 02".to_string()),
            ],
            10,
            10,
        );
        ScaleMonitor::new(model, CommandEncoder::new(registry), publisher)
    }

    #[test]
    fn field_captions_name_the_parameter() {
        assert_eq!(
            field_label(CommandOperation::AdjustReference),
            "Reference weight:"
        );
        assert_eq!(
            field_label(CommandOperation::SetCalibrationFactor),
            "Calibration factor:"
        );
        assert_eq!(field_label(CommandOperation::Tare), "Tare:");
    }

    #[test]
    fn invalid_reference_opens_dialog_without_publishing() {
        let published = Counting::default();
        let mut monitor = monitor(published.clone());
        let mut panel = ControlPanel::new(DeviceId(1));
        panel.reference_input = "twelve".to_string();

        assert!(!panel.submit(&mut monitor, CommandOperation::AdjustReference));
        assert_eq!(published.0.get(), 0);
        assert!(panel.error().unwrap().contains("reference weight"));
    }

    #[test]
    fn fields_feed_their_own_operation() {
        let published = Counting::default();
        let mut monitor = monitor(published.clone());
        let mut panel = ControlPanel::new(DeviceId(2));
        panel.factor_input = " 2280.5 ".to_string();

        assert!(panel.submit(&mut monitor, CommandOperation::SetCalibrationFactor));
        assert!(panel.submit(&mut monitor, CommandOperation::Tare));
        assert_eq!(published.0.get(), 2);
        assert!(panel.error().is_none());
        assert_eq!(panel.selected(), DeviceId(2));
    }
}
