//! # Monitor window
//!
//! eframe shell around the monitor core. Each frame the bridge is drained into the
//! [`ScaleMonitor`] model; plot data is only re-snapshotted on the render tick, so
//! drawing cost does not follow the telemetry rate.
//!
//! Layout:
//! - **Top panel**: connection status line
//! - **Central panel**: one panel per scale, then the control panel and the log
//! - **Bottom panel**: channel statistics

pub mod common;
pub mod control_panel;
pub mod device_panel;
pub mod log_panel;

use eframe::egui;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::bridge::BridgeReceiver;
use crate::monitor::ScaleMonitor;
use crate::telemetry::DeviceId;

use self::control_panel::ControlPanel;

/// Fixed-cadence trigger for refreshing plot snapshots.
#[derive(Debug, Clone)]
pub struct RenderTick {
    interval: Duration,
    last: Option<Instant>,
}

impl RenderTick {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True at most once per interval; the first call always fires.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

pub struct ScaleMonitorUI {
    monitor: ScaleMonitor,
    bridge: BridgeReceiver,
    tick: RenderTick,
    plots: BTreeMap<DeviceId, Vec<[f64; 2]>>,
    controls: ControlPanel,
}

impl ScaleMonitorUI {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        monitor: ScaleMonitor,
        bridge: BridgeReceiver,
        refresh_interval: Duration,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        let first = monitor
            .model()
            .devices()
            .first()
            .map(|d| d.id)
            .unwrap_or(DeviceId(1));

        Self {
            monitor,
            bridge,
            tick: RenderTick::new(refresh_interval),
            plots: BTreeMap::new(),
            controls: ControlPanel::new(first),
        }
    }

    fn refresh_plots(&mut self) {
        let model = self.monitor.model();
        for device in model.devices() {
            let points = device_panel::plot_points(&model.series().snapshot(device.id));
            self.plots.insert(device.id, points);
        }
    }
}

impl eframe::App for ScaleMonitorUI {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let drained = self.monitor.ingest(&mut self.bridge);
        if drained > 0 {
            debug!("Applied {} bridged events", drained);
        }
        if self.tick.due(Instant::now()) {
            self.refresh_plots();
        }
        ctx.request_repaint_after(self.tick.interval());

        egui::TopBottomPanel::top("status_panel")
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Scale Monitor");
                    ui.separator();
                    log_panel::render_connection(ui, self.monitor.model());
                });
            });

        egui::TopBottomPanel::bottom("stats_panel")
            .show_separator_line(false)
            .show(ctx, |ui| {
                log_panel::render_stats(ui, self.monitor.model());
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let devices = self.monitor.model().devices();
            ui.columns(devices.len().max(1), |columns| {
                for (column, device) in columns.iter_mut().zip(devices) {
                    let points = self
                        .plots
                        .get(&device.id)
                        .map(Vec::as_slice)
                        .unwrap_or(&[]);
                    device_panel::render(column, device, points);
                }
            });

            ui.add_space(6.0);
            self.controls.render(ui, &mut self.monitor);
            ui.add_space(6.0);
            log_panel::render_log(ui, self.monitor.model());
        });
    }
}
