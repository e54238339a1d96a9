pub mod panels;
pub mod windows;

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::app::AppState;
use crate::persistence::PersistentSettings;

/// Main UI system that renders all the egui panels
pub fn ui_system(
    mut contexts: EguiContexts,
    mut state: ResMut<AppState>,
    mut persistent_settings: ResMut<PersistentSettings>,
) {
    let ctx = contexts.ctx_mut();

    // Repaint while a request runs so progress keeps moving
    if state.is_busy() {
        ctx.request_repaint();
    } else {
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }

    render_top_panel(ctx, &mut state, &mut persistent_settings);
    render_status_bar(ctx, &state);
    render_central_panel(ctx, &mut state, &mut persistent_settings);

    windows::render_port_selection_window(ctx, &mut state, &mut persistent_settings);
    windows::render_about_window(ctx, &mut state);
    windows::render_factory_reset_window(ctx, &mut state);
}

fn render_top_panel(
    ctx: &egui::Context,
    state: &mut AppState,
    persistent_settings: &mut PersistentSettings,
) {
    egui::TopBottomPanel::top("top_panel")
        .frame(egui::Frame {
            inner_margin: egui::Margin::same(6.0),
            fill: ctx.style().visuals.window_fill(),
            ..Default::default()
        })
        .show(ctx, |ui| {
            panels::render_menu_bar(ui, state, persistent_settings);
        });
}

fn render_status_bar(ctx: &egui::Context, state: &AppState) {
    egui::TopBottomPanel::bottom("status_bar")
        .frame(egui::Frame {
            inner_margin: egui::Margin::symmetric(8.0, 4.0),
            fill: ctx.style().visuals.window_fill(),
            ..Default::default()
        })
        .show(ctx, |ui| {
            panels::render_status_bar(ui, state);
        });
}

fn render_central_panel(
    ctx: &egui::Context,
    state: &mut AppState,
    persistent_settings: &mut PersistentSettings,
) {
    egui::CentralPanel::default()
        .frame(egui::Frame {
            inner_margin: egui::Margin::same(8.0),
            fill: ctx.style().visuals.window_fill(),
            ..Default::default()
        })
        .show(ctx, |ui| {
            ui.horizontal_top(|ui| {
                let available_width = ui.available_width();
                let form_width = (available_width * 0.45).max(320.0);
                let console_width = available_width - form_width - 24.0;

                ui.group(|ui| {
                    panels::render_config_form(ui, state, persistent_settings, form_width);
                });

                ui.group(|ui| {
                    panels::render_console_section(ui, state, persistent_settings, console_width);
                });
            });
        });
}
