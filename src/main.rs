mod analysis;
mod app;
mod cache;
mod charts;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::SolarDashboardApp;
use cache::DatasetCache;
use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));

    // Every dataset is loaded and cleaned before the first frame.
    let cache = DatasetCache::load_all(&config);
    let state = AppState::new(config, cache);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Solar Farm Data Analysis Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SolarDashboardApp::new(state)))),
    )
}
