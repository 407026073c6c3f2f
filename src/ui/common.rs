//! Shared styling for the monitor window.

use eframe::egui::{Color32, Frame, Stroke};

use crate::mqtt::mqtt_handler::ConnectionState;

/// Dark theme palette.
pub struct UiColors;

impl UiColors {
    pub const INNER_BG: Color32 = Color32::from_rgb(25, 25, 25);
    pub const EXTREME_BG: Color32 = Color32::from_rgb(20, 20, 20);
    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);

    /// Connected
    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);
    /// Failed or retrying
    pub const WARNING: Color32 = Color32::from_rgb(230, 140, 20);
    /// Idle or connecting
    pub const NEUTRAL: Color32 = Color32::from_rgb(60, 130, 220);
}

pub fn create_frame(bg_color: Color32, border_color: Color32) -> Frame {
    Frame::new()
        .stroke(Stroke::new(1.0, border_color))
        .fill(bg_color)
        .inner_margin(4)
        .outer_margin(2)
}

/// Color of the "MQTT: <state>" line.
pub fn connection_color(state: &ConnectionState) -> Color32 {
    match state {
        ConnectionState::Connected => UiColors::ACTIVE,
        ConnectionState::Failed(_) | ConnectionState::Reconnecting => UiColors::WARNING,
        ConnectionState::Disconnected | ConnectionState::Connecting => UiColors::NEUTRAL,
    }
}
