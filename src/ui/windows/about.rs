use bevy_egui::egui;

use crate::app::AppState;
use crate::config::APP_TITLE;

pub fn render_about_window(ctx: &egui::Context, state: &mut AppState) {
    let mut show_about = state.show_about;

    if show_about {
        egui::Window::new("About")
            .open(&mut show_about)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.heading(APP_TITLE);
                ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                ui.separator();
                ui.label("Reads and writes the settings of a TinyAPRS KISS TNC / tracker over its serial console.");
                ui.label("Serial defaults: 9600 baud, 8N1.");
            });

        state.show_about = show_about;
    }
}
