use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use serialport::SerialPort;

use super::{PortInfo, SerialLink};
use crate::config::{SERIAL_POLL_INTERVAL_MS, SERIAL_WRITE_TIMEOUT_MS};
use crate::error::{ConfigToolError, ToolResult};

pub fn list_ports() -> ToolResult<Vec<PortInfo>> {
    let ports = serialport::available_ports()
        .map_err(|e| ConfigToolError::Serial(format!("failed to list ports: {e}")))?;

    Ok(ports
        .into_iter()
        .map(|p| {
            let port_type = match &p.port_type {
                serialport::SerialPortType::UsbPort(info) => match &info.product {
                    Some(product) => format!("USB {product} ({:04X}:{:04X})", info.vid, info.pid),
                    None => format!("USB ({:04X}:{:04X})", info.vid, info.pid),
                },
                serialport::SerialPortType::PciPort => "PCI".to_string(),
                serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                serialport::SerialPortType::Unknown => "Native".to_string(),
            };
            PortInfo {
                name: p.port_name,
                port_type,
            }
        })
        .collect())
}

/// A `serialport` backed link (8N1, no flow control)
pub struct SerialPortLink {
    port: Box<dyn SerialPort>,
    name: String,
    write_timeout: Duration,
}

impl SerialPortLink {
    pub fn open(port_path: &str, baud_rate: u32) -> ToolResult<Self> {
        if port_path.trim().is_empty() {
            return Err(ConfigToolError::Connection("no serial port selected".to_string()));
        }

        // Short low-level timeout so reads poll; the session enforces the
        // overall response deadline.
        let port = serialport::new(port_path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(SERIAL_POLL_INTERVAL_MS))
            .open()
            .map_err(|e| open_error(port_path, e))?;

        log::info!("Opened {port_path} at {baud_rate} baud");

        Ok(Self {
            port,
            name: port_path.to_string(),
            write_timeout: Duration::from_millis(SERIAL_WRITE_TIMEOUT_MS),
        })
    }
}

fn open_error(port_path: &str, e: serialport::Error) -> ConfigToolError {
    let reason = match e.kind() {
        serialport::ErrorKind::NoDevice => "port not found or busy".to_string(),
        serialport::ErrorKind::Io(ErrorKind::NotFound) => "port not found".to_string(),
        serialport::ErrorKind::Io(ErrorKind::PermissionDenied) => "permission denied".to_string(),
        _ => e.to_string(),
    };
    ConfigToolError::Connection(format!("failed to open port '{port_path}': {reason}"))
}

impl SerialLink for SerialPortLink {
    fn write_all(&mut self, data: &[u8]) -> ToolResult<()> {
        let deadline = Instant::now() + self.write_timeout;
        let mut remaining = data;

        while !remaining.is_empty() {
            match self.port.write(remaining) {
                Ok(0) => {
                    return Err(ConfigToolError::Serial(format!("{} stopped accepting data", self.name)));
                }
                Ok(n) => remaining = &remaining[n..],
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {
                    if Instant::now() >= deadline {
                        return Err(ConfigToolError::Timeout(self.write_timeout));
                    }
                }
                Err(e) => return Err(ConfigToolError::Serial(format!("write failed: {e}"))),
            }
        }

        self.port
            .flush()
            .map_err(|e| ConfigToolError::Serial(format!("flush failed: {e}")))
    }

    fn read(&mut self, buffer: &mut [u8]) -> ToolResult<usize> {
        match self.port.read(buffer) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => Ok(0),
            Err(e) => Err(ConfigToolError::Serial(format!("read failed: {e}"))),
        }
    }

    fn port_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_port_name_is_a_connection_error() {
        let err = SerialPortLink::open("  ", 9600).err().unwrap();
        assert!(matches!(err, ConfigToolError::Connection(_)));
    }

    #[test]
    fn missing_port_is_a_connection_error() {
        let err = SerialPortLink::open("/dev/tinyaprs-does-not-exist", 9600)
            .err()
            .unwrap();
        assert!(matches!(err, ConfigToolError::Connection(_)), "{err}");
    }
}
