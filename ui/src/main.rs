mod analytics;
mod app;
mod canvas;
mod inspector;
mod palette;
mod theme;

use app::BusnetApp;
use busnet_core::SimConfig;
use egui::ViewportBuilder;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional first argument: path to a JSON config.
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(&path).unwrap_or_else(|err| {
            log::error!("failed to load {path}: {err}; using defaults");
            SimConfig::default()
        }),
        None => SimConfig::default(),
    };

    let app = BusnetApp::new(config).map_err(|err| eframe::Error::AppCreation(Box::new(err)))?;

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1500.0, 820.0])
            .with_title("Busnet"),
        ..Default::default()
    };
    eframe::run_native(
        "Busnet",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
