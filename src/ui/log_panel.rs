use eframe::egui::{Label, RichText, ScrollArea, Ui};

use super::common::{connection_color, create_frame, UiColors};
use crate::monitor::{ChannelStats, MonitorModel};

pub fn render_log(ui: &mut Ui, model: &MonitorModel) {
    create_frame(UiColors::EXTREME_BG, UiColors::BORDER).show(ui, |ui| {
        ui.heading("Log");
        ScrollArea::vertical()
            .id_salt("event_log")
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for line in model.log() {
                    ui.add(Label::new(RichText::new(line.to_string()).monospace()).wrap());
                }
            });
    });
}

pub fn render_connection(ui: &mut Ui, model: &MonitorModel) {
    let state = model.connection();
    ui.label(
        RichText::new(format!("MQTT: {}", state))
            .color(connection_color(state))
            .strong(),
    );
}

pub fn stats_text(stats: &ChannelStats) -> String {
    let last = stats
        .last_activity
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    format!(
        "Messages received: {} | Weight samples: {} | Commands sent: {} | Last activity: {}",
        stats.messages_received, stats.weight_samples, stats.commands_requested, last
    )
}

pub fn render_stats(ui: &mut Ui, model: &MonitorModel) {
    ui.label(stats_text(model.stats()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_line_without_activity() {
        let stats = ChannelStats {
            messages_received: 12,
            weight_samples: 10,
            commands_requested: 1,
            last_activity: None,
        };
        assert_eq!(
            stats_text(&stats),
            "Messages received: 12 | Weight samples: 10 | Commands sent: 1 | Last activity: never"
        );
    }
}
