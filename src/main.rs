mod app;
mod audio;
mod color;
mod state;
mod ui;
mod worker;

use app::AudioCompareApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 850.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Audio Compare",
        options,
        Box::new(|cc| Ok(Box::new(AudioCompareApp::new(cc)))),
    )
}
