use bevy_egui::egui;

use crate::app::AppState;
use crate::config::BAUD_RATES;
use crate::persistence::PersistentSettings;

/// Renders the Settings > Port Selection window
pub fn render_port_selection_window(
    ctx: &egui::Context,
    state: &mut AppState,
    persistent_settings: &mut PersistentSettings,
) {
    let mut show_port_selection = state.show_port_selection;

    if show_port_selection {
        egui::Window::new("Port Selection")
            .open(&mut show_port_selection)
            .resizable(false)
            .default_width(320.0)
            .show(ctx, |ui| {
                render_port_list(ui, state, persistent_settings);
                ui.separator();
                render_baud_rate(ui, persistent_settings);
                ui.separator();
                render_connect_controls(ui, state, persistent_settings);
            });

        state.show_port_selection = show_port_selection && !state.is_connected();
    }
}

fn render_port_list(ui: &mut egui::Ui, state: &mut AppState, persistent_settings: &mut PersistentSettings) {
    ui.horizontal(|ui| {
        ui.label(format!("Available ports ({})", state.available_ports.len()));
        if ui.button("Refresh").clicked() {
            state.refresh_ports();
        }
    });

    if state.available_ports.is_empty() {
        ui.label("No serial ports found.");
    }

    for port in &state.available_ports {
        let selected = persistent_settings.port_path == port.name;
        if ui
            .selectable_label(selected, format!("{}  ({})", port.name, port.port_type))
            .clicked()
        {
            persistent_settings.port_path = port.name.clone();
        }
    }

    // Allow manual entry if not in list
    ui.horizontal(|ui| {
        ui.label("Port:");
        ui.text_edit_singleline(&mut persistent_settings.port_path);
    });
}

fn render_baud_rate(ui: &mut egui::Ui, persistent_settings: &mut PersistentSettings) {
    ui.horizontal(|ui| {
        ui.label("Baud rate:");
        egui::ComboBox::from_id_salt("baud_rate_select")
            .selected_text(persistent_settings.baud_rate.to_string())
            .show_ui(ui, |ui| {
                for rate in BAUD_RATES {
                    ui.selectable_value(&mut persistent_settings.baud_rate, rate, rate.to_string());
                }
            });
    });
}

fn render_connect_controls(ui: &mut egui::Ui, state: &mut AppState, persistent_settings: &PersistentSettings) {
    if state.is_connected() {
        ui.label("Disconnect before changing ports.");
        return;
    }
    if ui.button("Connect").clicked() {
        let result = state.connect(persistent_settings);
        if result.is_ok() {
            state.log_info(format!(
                "Opened {} at {} baud",
                persistent_settings.port_path, persistent_settings.baud_rate
            ));
        }
        state.report(result);
    }
}
