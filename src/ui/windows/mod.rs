pub mod about;
pub mod factory_reset;
pub mod port_selection;

pub use about::render_about_window;
pub use factory_reset::render_factory_reset_window;
pub use port_selection::render_port_selection_window;
