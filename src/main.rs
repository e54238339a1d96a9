use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_egui::EguiPlugin;

use tinyaprs_config::app::{AppState, device_sync_system};
use tinyaprs_config::config::APP_TITLE;
use tinyaprs_config::persistence::{PersistentSettings, auto_save_system};
use tinyaprs_config::ui::ui_system;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = PersistentSettings::load();
    log::info!(
        "Starting {} (last port {} @ {} baud)",
        APP_TITLE,
        settings.port_path,
        settings.baud_rate
    );

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: APP_TITLE.to_string(),
                        resolution: WindowResolution::new(980.0, 640.0),
                        ..default()
                    }),
                    ..default()
                })
                // env_logger owns the global logger
                .disable::<bevy::log::LogPlugin>(),
        )
        .add_plugins(EguiPlugin)
        .init_resource::<AppState>()
        .insert_resource(settings)
        .add_systems(Startup, setup_camera)
        .add_systems(Update, (device_sync_system, ui_system, auto_save_system).chain())
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
