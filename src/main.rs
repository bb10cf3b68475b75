mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod view;

use anyhow::Context;
use app::DashboardApp;
use clap::Parser;
use eframe::egui;

use config::Config;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::parse();

    // A bad startup file is fatal: nothing is rendered from a partial load.
    let mut state = AppState::new(&config);
    if let Some(path) = &config.data {
        let dataset = data::loader::load_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
        state.set_dataset(dataset);
    }
    log::info!("Production target: {}", config.target);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ops Dash – Production KPIs",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can render the sidebar logo.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(DashboardApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
