//! In-memory TinyAPRS console
//!
//! Behaves like the firmware console: lines are upper-cased, split at `=`,
//! queries print the stored value and setters store it first. Used by the
//! session tests and the integration tests; nothing touches real hardware.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use super::SerialLink;
use crate::aprs::{CallSsid, Phg, Position, Ssid, Symbol};
use crate::device_config::{DeviceConfig, RunModes};
use crate::error::{ConfigToolError, ToolResult};
use crate::protocol::{DEFAULT_TEST_PACKETS, MAX_TEST_PACKETS, join_path};

const BANNER: &str = "TinyAPRS TNC (KISS) 1.1-SNAPSHOT (f1a0-sim)";

#[derive(Debug)]
struct DeviceState {
    config: DeviceConfig,
    input: Vec<u8>,
    output: VecDeque<u8>,
    received: Vec<String>,
    silent: bool,
    extensions: bool,
    kiss_mode: bool,
    restarts: u32,
}

/// Cloning gives another handle onto the same device, so a test can keep
/// one while the session owns the other.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    state: Arc<Mutex<DeviceState>>,
    name: String,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new(DeviceConfig::default())
    }
}

impl SimulatedDevice {
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeviceState {
                config,
                input: Vec::new(),
                output: VecDeque::new(),
                received: Vec::new(),
                silent: false,
                extensions: true,
                kiss_mode: false,
                restarts: 0,
            })),
            name: "SIM".to_string(),
        }
    }

    /// Firmware without the MODE/SMART/FIXLOC/PHG/SYMBL commands
    pub fn legacy(config: DeviceConfig) -> Self {
        let device = Self::new(config);
        device.lock().extensions = false;
        device
    }

    /// Stop answering (device unplugged, wrong baud rate, KISS mode)
    pub fn set_silent(&self, silent: bool) {
        self.lock().silent = silent;
    }

    pub fn config(&self) -> DeviceConfig {
        self.lock().config.clone()
    }

    /// Lines the device received, without line endings
    pub fn received(&self) -> Vec<String> {
        self.lock().received.clone()
    }

    pub fn in_kiss_mode(&self) -> bool {
        self.lock().kiss_mode
    }

    pub fn restarts(&self) -> u32 {
        self.lock().restarts
    }

    /// Queue output that is not a reply to anything, e.g. a boot banner
    pub fn emit(&self, text: &str) {
        self.lock().output.extend(text.as_bytes());
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        // a panic in another test thread must not cascade
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SerialLink for SimulatedDevice {
    fn write_all(&mut self, data: &[u8]) -> ToolResult<()> {
        let mut state = self.lock();
        for &byte in data {
            match byte {
                b'\r' | b'\n' => {
                    if state.input.is_empty() {
                        continue;
                    }
                    let line = String::from_utf8_lossy(&state.input).into_owned();
                    state.input.clear();
                    state.received.push(line.clone());
                    if !state.silent && !state.kiss_mode {
                        state.handle_line(&line);
                    }
                }
                _ => state.input.push(byte),
            }
        }
        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> ToolResult<usize> {
        let mut state = self.lock();
        if state.output.is_empty() {
            drop(state);
            // stand-in for the port's poll interval
            thread::sleep(Duration::from_millis(1));
            return Ok(0);
        }
        let n = buffer.len().min(state.output.len());
        for (slot, byte) in buffer.iter_mut().zip(state.output.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn port_name(&self) -> &str {
        &self.name
    }
}

impl DeviceState {
    fn print(&mut self, text: &str) {
        self.output.extend(text.as_bytes());
    }

    fn println(&mut self, text: &str) {
        self.print(text);
        self.print("\r\n");
    }

    fn handle_line(&mut self, line: &str) {
        let command = line.to_ascii_uppercase();

        if let Some(count) = command.strip_prefix('!') {
            let count = match count.trim().parse::<u8>() {
                Ok(n) if (1..=MAX_TEST_PACKETS).contains(&n) => n,
                _ => DEFAULT_TEST_PACKETS,
            };
            self.println(&format!("Sending {count} test packet..."));
            return;
        }
        if command.starts_with('?') {
            self.print_info();
            return;
        }

        let Some(body) = command.strip_prefix("AT+").filter(|_| command.len() >= 6) else {
            self.println(&format!("INVALID CMD: {command}"));
            return;
        };

        // strtok semantics: empty segments are skipped
        let mut parts = body.split('=').filter(|s| !s.is_empty());
        let Some(key) = parts.next() else {
            self.println(&format!("INVALID CMD: {command}"));
            return;
        };
        let value = parts.next();

        let handled = match key {
            "MYCALL" => self.my_call(value),
            "DEST" => self.dest(value),
            "MYSSID" => self.my_ssid(value),
            "PATH" => self.path(value),
            "LOCA" => self.location(value),
            "CMNTS" => self.comments(value),
            "SEND" => self.send(value),
            "KISS" => self.kiss(value),
            "RESET" => self.reset(value),
            "SYMBL" if !self.extensions => {
                // old firmware stub, no line ending
                self.print("Not implemented yet");
                true
            }
            "SYMBL" => self.symbol(value),
            "MODE" if self.extensions => self.mode(value),
            "SMART" if self.extensions => self.flag(value, "SMART", |c| &mut c.smart_beacon),
            "FIXLOC" if self.extensions => self.flag(value, "FIXLOC", |c| &mut c.fixed_location),
            "PHG" if self.extensions => self.phg(value),
            _ => {
                self.println(&format!("UNKNOWN CMD: {command}"));
                return;
            }
        };

        if !handled {
            self.println("INVALID CMD VALUE");
        }
    }

    fn print_info(&mut self) {
        let my_call = self.config.my_call();
        self.print("\r\n");
        self.println(BANNER);
        self.println(&format!("MyCall: {my_call}"));
        self.println("Free RAM: 512");
        self.print("\r\nAT commands supported\r\n");
        self.println("AT+MYCALL=[CALLSIGN]-[SSID]\t;Set my callsign");
        self.println("AT+KISS=1\t\t\t;Enter kiss mode");
        self.println("?\t\t\t\t;Display help messages");
    }

    fn my_call(&mut self, value: Option<&str>) -> bool {
        if let Some(value) = value {
            let Ok(call) = value.parse::<CallSsid>() else {
                return false;
            };
            self.config.callsign = call.call;
            self.config.ssid = call.ssid;
        }
        let text = format!("MYCALL: {}", self.config.my_call());
        self.println(&text);
        true
    }

    fn dest(&mut self, value: Option<&str>) -> bool {
        if let Some(value) = value {
            let Ok(call) = value.parse::<CallSsid>() else {
                return false;
            };
            self.config.destination = call;
        }
        let text = format!("DEST: {}", self.config.destination);
        self.println(&text);
        true
    }

    fn my_ssid(&mut self, value: Option<&str>) -> bool {
        if let Some(value) = value {
            let Ok(ssid) = value.parse::<Ssid>() else {
                return false;
            };
            self.config.ssid = ssid;
        }
        let text = format!("MY_SSID: {}", self.config.ssid);
        self.println(&text);
        true
    }

    fn path(&mut self, value: Option<&str>) -> bool {
        if let Some(value) = value {
            let hops: Result<Vec<CallSsid>, ConfigToolError> =
                value.split(',').filter(|s| !s.is_empty()).take(2).map(str::parse).collect();
            let Ok(hops) = hops else {
                return false;
            };
            // a single hop only replaces the first entry
            for (index, hop) in hops.into_iter().enumerate() {
                if index < self.config.path.len() {
                    self.config.path[index] = hop;
                } else {
                    self.config.path.push(hop);
                }
            }
        }
        let text = if self.config.path.is_empty() {
            "PATH:".to_string()
        } else {
            format!("PATH: {}", join_path(&self.config.path))
        };
        self.println(&text);
        true
    }

    fn location(&mut self, value: Option<&str>) -> bool {
        if let Some(value) = value {
            let Ok(position) = Position::from_aprs(value) else {
                return false;
            };
            self.config.position = position;
        }
        let text = format!("Location:{}", self.config.position.to_aprs());
        self.println(&text);
        true
    }

    fn comments(&mut self, value: Option<&str>) -> bool {
        if let Some(value) = value {
            self.config.comment = value.to_string();
        }
        let text = format!(">{}", self.config.comment);
        self.println(&text);
        true
    }

    fn symbol(&mut self, value: Option<&str>) -> bool {
        if let Some(value) = value {
            let Ok(symbol) = value.parse::<Symbol>() else {
                return false;
            };
            self.config.symbol = symbol;
        }
        let text = format!("SYMBL: {}", self.config.symbol.to_wire());
        self.println(&text);
        true
    }

    fn mode(&mut self, value: Option<&str>) -> bool {
        if let Some(value) = value {
            let Some(modes) = value.parse::<u8>().ok().and_then(|b| RunModes::from_bits(b).ok()) else {
                return false;
            };
            self.config.modes = modes;
        }
        let text = format!("MODE: {}", self.config.modes.bits());
        self.println(&text);
        true
    }

    fn flag(
        &mut self,
        value: Option<&str>,
        name: &str,
        field: impl Fn(&mut DeviceConfig) -> &mut bool,
    ) -> bool {
        if let Some(value) = value {
            let on = match value {
                "0" => false,
                "1" => true,
                _ => return false,
            };
            *field(&mut self.config) = on;
        }
        let on = *field(&mut self.config);
        self.println(&format!("{name}: {}", u8::from(on)));
        true
    }

    fn phg(&mut self, value: Option<&str>) -> bool {
        if let Some(value) = value {
            let Ok(phg) = value.parse::<Phg>() else {
                return false;
            };
            self.config.phg = phg;
        }
        let text = format!("PHG: {}", self.config.phg.to_wire());
        self.println(&text);
        true
    }

    fn send(&mut self, value: Option<&str>) -> bool {
        match value {
            None => self.println("SEND OK"),
            Some(_) => self.println("NOT SUPPRTED YET"),
        }
        true
    }

    fn kiss(&mut self, value: Option<&str>) -> bool {
        if value == Some("1") {
            self.kiss_mode = true;
        }
        true
    }

    fn reset(&mut self, value: Option<&str>) -> bool {
        match value.and_then(|v| v.chars().next()) {
            Some('1') => self.println("Restarting..."),
            Some('2') => {
                self.config = DeviceConfig::default();
                self.println("Settings cleared, Restarting...");
            }
            _ => return true,
        }
        self.restarts += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(device: &mut SimulatedDevice, line: &str) -> String {
        device.write_all(format!("{line}\r\n").as_bytes()).unwrap();
        let mut out = Vec::new();
        let mut buf = [0u8; 32];
        loop {
            let n = device.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn queries_print_current_values() {
        let mut device = SimulatedDevice::default();
        assert_eq!(exchange(&mut device, "AT+MYCALL"), "MYCALL: BG5HHP-1\r\n");
        assert_eq!(exchange(&mut device, "AT+PATH"), "PATH: WIDE1-1,WIDE2-2\r\n");
        assert_eq!(exchange(&mut device, "at+loca"), "Location:3007.41N/12007.41E\r\n");
    }

    #[test]
    fn setters_store_upper_cased_values() {
        let mut device = SimulatedDevice::default();
        assert_eq!(exchange(&mut device, "AT+CMNTS=hello"), ">HELLO\r\n");
        assert_eq!(device.config().comment, "HELLO");
        assert_eq!(device.received(), ["AT+CMNTS=hello"]);
    }

    #[test]
    fn errors_follow_firmware_wording() {
        let mut device = SimulatedDevice::default();
        assert_eq!(exchange(&mut device, "AT+MYSSID=42"), "INVALID CMD VALUE\r\n");
        assert_eq!(exchange(&mut device, "AT+FOO=1"), "UNKNOWN CMD: AT+FOO=1\r\n");
        assert_eq!(exchange(&mut device, "HELLO"), "INVALID CMD: HELLO\r\n");
    }

    #[test]
    fn legacy_firmware_lacks_extension_commands() {
        let mut device = SimulatedDevice::legacy(DeviceConfig::default());
        assert_eq!(exchange(&mut device, "AT+MODE"), "UNKNOWN CMD: AT+MODE\r\n");
        assert_eq!(exchange(&mut device, "AT+SYMBL"), "Not implemented yet");
    }

    #[test]
    fn kiss_mode_silences_the_console() {
        let mut device = SimulatedDevice::default();
        assert_eq!(exchange(&mut device, "AT+KISS=1"), "");
        assert!(device.in_kiss_mode());
        assert_eq!(exchange(&mut device, "AT+MYCALL"), "");
    }

    #[test]
    fn factory_reset_restores_defaults() {
        let mut device = SimulatedDevice::default();
        exchange(&mut device, "AT+MYCALL=N0CALL-9");
        assert_eq!(
            exchange(&mut device, "AT+RESET=2"),
            "Settings cleared, Restarting...\r\n"
        );
        assert_eq!(device.config().my_call().to_string(), "BG5HHP-1");
        assert_eq!(device.restarts(), 1);
    }
}
