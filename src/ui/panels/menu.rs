use bevy_egui::egui;

use crate::app::AppState;
use crate::persistence::PersistentSettings;

/// Renders the menu bar with Settings/About and the connect button
pub fn render_menu_bar(
    ui: &mut egui::Ui,
    state: &mut AppState,
    persistent_settings: &mut PersistentSettings,
) {
    egui::menu::bar(ui, |ui| {
        ui.menu_button("Settings", |ui| {
            if ui.button("Port Selection").clicked() {
                state.refresh_ports();
                state.show_port_selection = true;
                ui.close_menu();
            }
            ui.checkbox(&mut persistent_settings.show_advanced, "Show destination and path");
        });

        if ui.button("About").clicked() {
            state.show_about = true;
        }

        ui.separator();

        ui.label(format!(
            "{} @ {} baud",
            persistent_settings.port_path, persistent_settings.baud_rate
        ));

        let busy = state.is_busy();
        if state.is_connected() {
            if ui.add_enabled(!busy, egui::Button::new("Disconnect")).clicked() {
                state.disconnect();
            }
        } else if ui.button("Connect").clicked() {
            let result = state.connect(persistent_settings);
            state.report(result);
        }
    });
}
