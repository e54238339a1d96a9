//! Configuration tool for TinyAPRS KISS TNC / tracker devices.
//!
//! The device speaks a line based AT command console over a serial port.
//! [`session::DeviceSession`] drives that console, [`uart`] runs a session on
//! a worker thread and [`ui`] renders the bevy_egui front end.

pub mod app;
pub mod aprs;
pub mod config;
pub mod console;
pub mod device_config;
pub mod error;
pub mod form;
pub mod parser;
pub mod persistence;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod uart;
pub mod ui;

pub use error::{ConfigToolError, ToolResult};
