//! APRS field types used by the device configuration
//!
//! Pure value types with validation; no I/O.

pub mod callsign;
pub mod phg;
pub mod position;
pub mod symbol;

pub use callsign::{CallSsid, Callsign, Ssid};
pub use phg::Phg;
pub use position::Position;
pub use symbol::Symbol;
