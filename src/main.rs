mod gui;
mod logging;

use gui::ProcessNameApp;

fn main() -> eframe::Result<()> {
    logging::init();

    // Configure native options for the GUI
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 600.0])
            .with_title("Process Name Lookup"),
        ..Default::default()
    };

    // Run the GUI application
    eframe::run_native(
        "Process Name Lookup",
        options,
        Box::new(|cc| Box::new(ProcessNameApp::new(cc))),
    )
}
