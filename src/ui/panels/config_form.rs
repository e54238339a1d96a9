use bevy_egui::egui;

use crate::app::AppState;
use crate::aprs::callsign::MAX_SSID;
use crate::aprs::phg::{self, MAX_DIRECTIVITY, PHG_DIGITS};
use crate::persistence::PersistentSettings;
use crate::protocol::MAX_TEST_PACKETS;

/// Renders the device configuration form and its action buttons
pub fn render_config_form(
    ui: &mut egui::Ui,
    state: &mut AppState,
    persistent_settings: &PersistentSettings,
    width: f32,
) {
    ui.vertical(|ui| {
        ui.set_width(width);
        ui.heading("Device Configuration");
        ui.separator();

        render_station_fields(ui, state);
        ui.add_space(6.0);
        render_mode_flags(ui, state);
        ui.add_space(6.0);
        render_beacon_fields(ui, state);

        if persistent_settings.show_advanced {
            ui.add_space(6.0);
            render_routing_fields(ui, state);
        }

        ui.add_space(10.0);
        ui.separator();
        render_form_buttons(ui, state);
        ui.add_space(6.0);
        render_device_actions(ui, state);
    });
}

fn render_station_fields(ui: &mut egui::Ui, state: &mut AppState) {
    egui::Grid::new("station_grid")
        .num_columns(4)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            let form = &mut state.form;

            ui.label("CALLSIGN:");
            ui.add(egui::TextEdit::singleline(&mut form.callsign).desired_width(90.0));
            ui.label("SSID:");
            egui::ComboBox::from_id_salt("ssid_select")
                .selected_text(form.ssid.clone())
                .width(50.0)
                .show_ui(ui, |ui| {
                    for ssid in 0..=MAX_SSID {
                        ui.selectable_value(&mut form.ssid, ssid.to_string(), ssid.to_string());
                    }
                });
            ui.end_row();

            ui.label("LAT:");
            ui.add(egui::TextEdit::singleline(&mut form.latitude).desired_width(110.0));
            ui.label("LON:");
            ui.add(egui::TextEdit::singleline(&mut form.longitude).desired_width(110.0));
            ui.end_row();
        });
}

fn render_mode_flags(ui: &mut egui::Ui, state: &mut AppState) {
    let form = &mut state.form;
    ui.horizontal_wrapped(|ui| {
        ui.checkbox(&mut form.kiss, "KISS TNC");
        ui.checkbox(&mut form.digi, "DIGI REPEATER");
        ui.checkbox(&mut form.tracker, "TRACKER");
    });
}

fn render_beacon_fields(ui: &mut egui::Ui, state: &mut AppState) {
    let form = &mut state.form;

    ui.label("Beacon");
    ui.horizontal_wrapped(|ui| {
        ui.checkbox(&mut form.smart_beacon, "SMART BEACON");
        ui.checkbox(&mut form.fixed_location, "FIXED LOCATION");
    });

    egui::Grid::new("beacon_grid")
        .num_columns(4)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("POWER:");
            phg_combo(ui, "phg_power", &mut form.power, PHG_DIGITS - 1, phg::power_label);
            ui.label("HEIGHT:");
            phg_combo(ui, "phg_height", &mut form.height, PHG_DIGITS - 1, phg::height_label);
            ui.end_row();

            ui.label("ANT:");
            phg_combo(ui, "phg_gain", &mut form.gain, PHG_DIGITS - 1, phg::gain_label);
            ui.label("DIR:");
            phg_combo(ui, "phg_dir", &mut form.directivity, MAX_DIRECTIVITY, phg::directivity_label);
            ui.end_row();

            ui.label("ICON:");
            ui.add(egui::TextEdit::singleline(&mut form.icon).desired_width(30.0).char_limit(2));
            ui.end_row();
        });

    ui.horizontal(|ui| {
        ui.label("TEXT:");
        ui.add(egui::TextEdit::singleline(&mut form.beacon_text).desired_width(f32::INFINITY));
    });
}

fn phg_combo(ui: &mut egui::Ui, id: &str, value: &mut u8, max: u8, label: fn(u8) -> String) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(label(*value))
        .width(80.0)
        .show_ui(ui, |ui| {
            for code in 0..=max {
                ui.selectable_value(value, code, label(code));
            }
        });
}

fn render_routing_fields(ui: &mut egui::Ui, state: &mut AppState) {
    let form = &mut state.form;
    egui::Grid::new("routing_grid")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("DEST:");
            ui.add(egui::TextEdit::singleline(&mut form.destination).desired_width(90.0));
            ui.end_row();

            ui.label("PATH:");
            ui.add(egui::TextEdit::singleline(&mut form.path).desired_width(160.0))
                .on_hover_text("Up to two hops, e.g. WIDE1-1,WIDE2-2");
            ui.end_row();
        });
}

fn render_form_buttons(ui: &mut egui::Ui, state: &mut AppState) {
    let enabled = state.is_connected() && !state.is_busy();

    ui.horizontal(|ui| {
        if ui.add_enabled(enabled, egui::Button::new("Read")).clicked() {
            let result = state.read();
            state.report(result);
        }
        if ui.add_enabled(enabled, egui::Button::new("Save")).clicked() {
            let result = state.save();
            state.report(result);
        }
        if ui.button("Defaults").on_hover_text("Reset the form, not the device").clicked() {
            let console_command = std::mem::take(&mut state.form.console_command);
            state.form = Default::default();
            state.form.console_command = console_command;
        }
    });
}

fn render_device_actions(ui: &mut egui::Ui, state: &mut AppState) {
    let enabled = state.is_connected() && !state.is_busy();

    egui::CollapsingHeader::new("Device actions")
        .default_open(false)
        .show(ui, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.horizontal_wrapped(|ui| {
                    if ui.button("Send beacon").clicked() {
                        let result = state.send_beacon();
                        state.report(result);
                    }

                    ui.add(egui::DragValue::new(&mut state.form.test_packets).range(1..=MAX_TEST_PACKETS));
                    if ui.button("Send test packets").clicked() {
                        let result = state.send_test_packets();
                        state.report(result);
                    }
                });

                ui.horizontal_wrapped(|ui| {
                    if ui
                        .button("Enter KISS mode")
                        .on_hover_text("The console stops answering until the device restarts")
                        .clicked()
                    {
                        let result = state.enter_kiss();
                        state.report(result);
                    }
                    if ui.button("Reboot").clicked() {
                        let result = state.reboot(false);
                        state.report(result);
                    }
                    if ui.button("Factory reset...").clicked() {
                        state.confirm_factory_reset = true;
                    }
                });
            });
        });
}
