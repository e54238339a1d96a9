use bevy_egui::egui;
use egui::Color32;

use crate::app::AppState;
use crate::console::LineKind;
use crate::persistence::PersistentSettings;

/// Renders the AT CMD line and the RECV pane
pub fn render_console_section(
    ui: &mut egui::Ui,
    state: &mut AppState,
    persistent_settings: &mut PersistentSettings,
    width: f32,
) {
    ui.vertical(|ui| {
        ui.set_width(width);

        let can_send = state.is_connected() && !state.is_busy();
        ui.horizontal(|ui| {
            ui.label("AT CMD:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut state.form.console_command)
                    .desired_width(width - 140.0)
                    .font(egui::TextStyle::Monospace),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.add_enabled(can_send, egui::Button::new("Send")).clicked() || (submitted && can_send) {
                let result = state.send_raw();
                state.report(result);
            }
        });

        ui.horizontal(|ui| {
            ui.label("RECV:");
            ui.checkbox(&mut persistent_settings.auto_scroll_console, "Auto-scroll");
            if ui.button("clear").clicked()
                && let Ok(mut console) = state.console.lock()
            {
                console.clear();
            }
        });

        let Ok(console) = state.console.lock() else {
            return;
        };

        egui::ScrollArea::vertical()
            .id_salt("device_console")
            .auto_shrink([false; 2])
            .stick_to_bottom(persistent_settings.auto_scroll_console)
            .show(ui, |ui| {
                for line in console.lines.iter() {
                    let (prefix, color) = match line.kind {
                        LineKind::Sent => (">>", Color32::from_rgb(120, 170, 255)),
                        LineKind::Received => ("<<", ui.visuals().text_color()),
                        LineKind::Info => ("--", Color32::GRAY),
                        LineKind::Error => ("!!", Color32::from_rgb(255, 100, 100)),
                    };
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(format!("[{}]", line.clock_time.format("%H:%M:%S%.3f")))
                                .color(Color32::GRAY)
                                .monospace(),
                        );
                        ui.label(
                            egui::RichText::new(format!("{prefix} {}", line.text))
                                .color(color)
                                .monospace(),
                        );
                    });
                }
            });
    });
}
