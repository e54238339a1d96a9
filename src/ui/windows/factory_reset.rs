use bevy_egui::egui;

use crate::app::AppState;

/// Asks before wiping the device settings
pub fn render_factory_reset_window(ctx: &egui::Context, state: &mut AppState) {
    if !state.confirm_factory_reset {
        return;
    }

    let mut close = false;
    egui::Window::new("Factory reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Clear all settings stored on the device and restart it?");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Clear settings").clicked() {
                    let result = state.reboot(true);
                    state.report(result);
                    close = true;
                }
                if ui.button("Cancel").clicked() {
                    close = true;
                }
            });
        });

    if close {
        state.confirm_factory_reset = false;
    }
}
