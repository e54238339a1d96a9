pub mod config_form;
pub mod console;
pub mod menu;
pub mod status_bar;

pub use config_form::render_config_form;
pub use console::render_console_section;
pub use menu::render_menu_bar;
pub use status_bar::render_status_bar;
