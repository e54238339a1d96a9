use bevy_egui::egui;

use crate::app::AppState;

pub fn render_status_bar(ui: &mut egui::Ui, state: &AppState) {
    let Ok(console) = state.console.lock() else {
        return;
    };

    ui.horizontal(|ui| {
        ui.label(&console.status);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.add(
                egui::ProgressBar::new(console.progress)
                    .desired_width(160.0)
                    .show_percentage()
                    .animate(console.busy),
            );
            if let Some(last) = console.lines.back() {
                ui.label(format!("Last activity {}", last.clock_time.format("%H:%M:%S")));
            }
        });
    });
}
