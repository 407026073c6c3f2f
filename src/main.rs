use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use scale_monitor::bridge;
use scale_monitor::config::AppConfig;
use scale_monitor::monitor::{MonitorModel, ScaleMonitor};
use scale_monitor::mqtt::mqtt_handler::MqttHandle;
use scale_monitor::telemetry::CommandEncoder;
use scale_monitor::ui::ScaleMonitorUI;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = AppConfig::load_or_default().await?;
    let registry = Arc::new(
        config
            .registry()
            .map_err(|e| eyre!("Invalid topic configuration: {}", e))?,
    );
    info!(
        "Monitoring {} scales on {}:{}",
        config.devices.len(),
        config.broker.host,
        config.broker.port
    );

    let (bridge_tx, bridge_rx) = bridge::channel();
    let mqtt_handle = MqttHandle::spawn(
        config.connection_params(&registry),
        config.reconnect_policy(),
        registry.clone(),
        bridge_tx,
    );

    let model = MonitorModel::new(
        config.device_labels(),
        config.display.max_plot_points,
        config.display.log_lines,
    );
    let monitor = ScaleMonitor::new(
        model,
        CommandEncoder::new(registry),
        mqtt_handle.publisher(),
    );

    info!("Starting UI");
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Scale Monitor")
            .with_inner_size([1100.0, 800.0]),
        ..Default::default()
    };
    let refresh_interval = config.refresh_interval();

    let ui_result = eframe::run_native(
        "Scale Monitor",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(ScaleMonitorUI::new(
                cc,
                monitor,
                bridge_rx,
                refresh_interval,
            )))
        }),
    );

    info!("Closing application. Disconnecting MQTT...");
    mqtt_handle.shutdown(config.shutdown_timeout()).await;

    ui_result.map_err(|e| {
        error!("UI exited with error: {}", e);
        eyre!("UI exited with error: {}", e)
    })
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
