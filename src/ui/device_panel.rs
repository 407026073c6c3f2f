use eframe::egui::{self, RichText, Ui};
use egui_plot::{Line, Plot, PlotPoints};

use super::common::{create_frame, UiColors};
use crate::monitor::DeviceState;
use crate::telemetry::Sample;

/// Plot points as drawn on the last render tick.
pub fn plot_points(samples: &[Sample]) -> Vec<[f64; 2]> {
    samples
        .iter()
        .map(|s| [s.index as f64, s.weight])
        .collect()
}

/// Weight readout, status line and live plot of one scale.
pub fn render(ui: &mut Ui, device: &DeviceState, points: &[[f64; 2]]) {
    create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
        ui.vertical(|ui| {
            ui.heading(device.label.as_str());
            ui.horizontal(|ui| {
                ui.label("Current weight:");
                ui.label(RichText::new(device.weight_text()).size(22.0).strong());
            });
            ui.horizontal(|ui| {
                ui.label("Status:");
                ui.label(device.status.as_str());
            });

            let line: PlotPoints = points.iter().copied().collect();
            Plot::new(egui::Id::new(("weight_plot", device.id.index())))
                .height(220.0)
                .x_axis_label("samples")
                .y_axis_label("kg")
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new(line).name(&device.label));
                });
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_map_to_index_weight_pairs() {
        let samples = [
            Sample {
                index: 4,
                weight: 1.5,
            },
            Sample {
                index: 7,
                weight: 1.25,
            },
        ];
        assert_eq!(plot_points(&samples), vec![[4.0, 1.5], [7.0, 1.25]]);
    }
}
