//! Serial transport
//!
//! `SerialLink` is the byte pipe the session talks through. `serial` backs it
//! with a real port, `mock` with an in-memory TinyAPRS console.

pub mod mock;
pub mod serial;

use crate::error::ToolResult;

pub use mock::SimulatedDevice;
pub use serial::{SerialPortLink, list_ports};

/// An open connection to a device.
/// Only requires `Send`: it is owned by the worker thread.
pub trait SerialLink: Send {
    /// Write every byte or fail once the write deadline passes
    fn write_all(&mut self, data: &[u8]) -> ToolResult<()>;

    /// Read whatever is available; `Ok(0)` when the poll interval elapsed
    /// without data
    fn read(&mut self, buffer: &mut [u8]) -> ToolResult<usize>;

    fn port_name(&self) -> &str;
}

/// A port found on the system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    pub port_type: String,
}
