mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::EntradaNfApp;
use config::AppConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration, using defaults: {e:#}");
            AppConfig::default()
        }
    };
    log::info!("Configuration: {config:?}");

    // The source is read once; filter changes work on the in-memory snapshot.
    let state = AppState::startup(config, chrono::Local::now().date_naive());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Entrada NF – Invoice Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(EntradaNfApp::new(state)))),
    )
}
