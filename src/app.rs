use bevy::prelude::*;
use std::sync::{Arc, Mutex, mpsc};

use crate::console::{ConsoleBuffer, LineKind};
use crate::error::{ConfigToolError, ToolResult};
use crate::form::FormFields;
use crate::persistence::PersistentSettings;
use crate::session::DeviceSession;
use crate::transport::{PortInfo, list_ports};
use crate::uart::{self, DeviceRequest};

#[derive(Resource)]
pub struct AppState {
    pub console: Arc<Mutex<ConsoleBuffer>>,
    pub form: FormFields,
    pub device_sender: Option<mpsc::Sender<DeviceRequest>>,
    pub available_ports: Vec<PortInfo>,
    pub show_port_selection: bool,
    pub show_about: bool,
    pub confirm_factory_reset: bool,
}

impl Default for AppState {
    fn default() -> Self {
        let mut state = Self {
            console: Arc::new(Mutex::new(ConsoleBuffer::new())),
            form: FormFields::default(),
            device_sender: None,
            available_ports: Vec::new(),
            show_port_selection: false,
            show_about: false,
            confirm_factory_reset: false,
        };
        state.refresh_ports();
        state
    }
}

impl AppState {
    pub fn is_connected(&self) -> bool {
        self.device_sender.is_some()
            && self
                .console
                .lock()
                .map(|c| c.connected_port().is_some())
                .unwrap_or(false)
    }

    pub fn is_busy(&self) -> bool {
        self.console.lock().map(|c| c.busy).unwrap_or(false)
    }

    pub fn refresh_ports(&mut self) {
        match list_ports() {
            Ok(ports) => self.available_ports = ports,
            Err(e) => {
                log::warn!("{e}");
                self.available_ports.clear();
            }
        }
    }

    pub fn connect(&mut self, settings: &PersistentSettings) -> ToolResult<()> {
        if self.is_connected() {
            let port = self
                .console
                .lock()
                .ok()
                .and_then(|c| c.connected_port().map(str::to_string))
                .unwrap_or_default();
            return Err(ConfigToolError::Connection(format!("already connected to {port}")));
        }

        let sender = uart::start_device_thread(&settings.port_path, settings.baud_rate, Arc::clone(&self.console))?;
        self.device_sender = Some(sender);
        Ok(())
    }

    /// Run an already opened session, e.g. over a simulated device
    pub fn attach(&mut self, session: DeviceSession) {
        self.disconnect();
        self.device_sender = Some(uart::spawn_worker(session, Arc::clone(&self.console)));
    }

    pub fn disconnect(&mut self) {
        if let Some(sender) = self.device_sender.take() {
            let _ = sender.send(DeviceRequest::Disconnect);
        }
    }

    /// Drop the sender once the worker has closed the link by itself
    pub fn sync_connection(&mut self) {
        if self.device_sender.is_some() && !self.is_connected() {
            self.device_sender = None;
        }
    }

    pub fn read(&self) -> ToolResult<()> {
        self.request(DeviceRequest::ReadConfig)
    }

    /// Field errors are reported without touching the device
    pub fn save(&self) -> ToolResult<()> {
        let config = self.form.to_config()?;
        self.request(DeviceRequest::SaveConfig(config))
    }

    pub fn send_raw(&self) -> ToolResult<()> {
        let text = self.form.console_command.trim();
        if text.is_empty() {
            return Err(ConfigToolError::validation("console command", "must not be empty"));
        }
        self.request(DeviceRequest::SendRaw(text.to_string()))
    }

    pub fn send_beacon(&self) -> ToolResult<()> {
        self.request(DeviceRequest::SendBeacon)
    }

    pub fn send_test_packets(&self) -> ToolResult<()> {
        self.request(DeviceRequest::SendTest(self.form.test_packets))
    }

    pub fn enter_kiss(&self) -> ToolResult<()> {
        self.request(DeviceRequest::EnterKiss)
    }

    pub fn reboot(&self, clear: bool) -> ToolResult<()> {
        self.request(DeviceRequest::Reboot { clear })
    }

    fn request(&self, request: DeviceRequest) -> ToolResult<()> {
        let sender = self.device_sender.as_ref().ok_or(ConfigToolError::NotConnected)?;
        sender.send(request).map_err(|_| ConfigToolError::NotConnected)
    }

    /// Show a failed action in the status bar and the console
    pub fn report(&self, result: ToolResult<()>) {
        if let Err(e) = result {
            log::warn!("{e}");
            if let Ok(mut console) = self.console.lock() {
                console.fail(&e);
            }
        }
    }

    pub fn log_info(&self, text: impl Into<String>) {
        if let Ok(mut console) = self.console.lock() {
            console.push(LineKind::Info, text);
        }
    }

    /// Move a completed read into the form
    pub fn apply_loaded_config(&mut self) -> bool {
        let loaded = self.console.lock().ok().and_then(|mut c| c.take_loaded_config());
        match loaded {
            Some(config) => {
                self.form.apply_config(&config);
                true
            }
            None => false,
        }
    }
}

/// Keeps the form and connection flag in step with the device worker
pub fn device_sync_system(mut state: ResMut<AppState>) {
    state.sync_connection();
    state.apply_loaded_config();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionOptions;
    use crate::transport::SimulatedDevice;
    use std::time::Duration;

    fn simulated_session(device: &SimulatedDevice) -> DeviceSession {
        let options = SessionOptions {
            response_timeout: Duration::from_millis(200),
            command_delay: Duration::ZERO,
            idle_gap: Duration::from_millis(20),
        };
        DeviceSession::with_options(Box::new(device.clone()), options)
    }

    fn offline_state() -> AppState {
        AppState {
            console: Arc::new(Mutex::new(ConsoleBuffer::new())),
            form: FormFields::default(),
            device_sender: None,
            available_ports: Vec::new(),
            show_port_selection: false,
            show_about: false,
            confirm_factory_reset: false,
        }
    }

    #[test]
    fn actions_need_a_connection() {
        let state = offline_state();
        assert!(matches!(state.read(), Err(ConfigToolError::NotConnected)));
        assert!(matches!(state.send_beacon(), Err(ConfigToolError::NotConnected)));
    }

    #[test]
    fn save_validates_before_sending() {
        let mut state = offline_state();
        state.form.callsign = "TOOLONGCALL".into();
        assert!(matches!(state.save(), Err(ConfigToolError::Validation { field: "callsign", .. })));
    }

    #[test]
    fn empty_console_command_is_rejected() {
        let mut state = offline_state();
        state.form.console_command = "  ".into();
        assert!(matches!(state.send_raw(), Err(ConfigToolError::Validation { .. })));
    }

    #[test]
    fn report_puts_errors_in_the_status_bar() {
        let state = offline_state();
        state.report(state.read());
        let console = state.console.lock().unwrap();
        assert_eq!(console.status, "Not connected to a device");
        assert_eq!(console.lines.back().unwrap().kind, LineKind::Error);
    }

    #[test]
    fn connecting_to_a_missing_port_fails() {
        let mut state = offline_state();
        let settings = PersistentSettings {
            port_path: "/dev/tinyaprs-does-not-exist".into(),
            ..PersistentSettings::default()
        };
        assert!(matches!(state.connect(&settings), Err(ConfigToolError::Connection(_))));
        assert!(!state.is_connected());
    }

    #[test]
    fn connect_refuses_a_second_link() {
        let mut state = offline_state();
        state.attach(simulated_session(&SimulatedDevice::default()));
        assert!(state.is_connected());

        let err = state.connect(&PersistentSettings::default()).unwrap_err();
        assert!(matches!(&err, ConfigToolError::Connection(reason) if reason.contains("SIM")), "{err}");
        assert!(state.is_connected());
        state.disconnect();
    }

    #[test]
    fn reattaching_during_a_request_keeps_the_new_link() {
        let silent = SimulatedDevice::default();
        silent.set_silent(true);
        let mut state = offline_state();
        state.attach(simulated_session(&silent));
        state.read().unwrap();

        let device = SimulatedDevice::default();
        state.attach(simulated_session(&device));
        assert!(state.is_connected());

        // the first worker's read times out and it exits meanwhile
        std::thread::sleep(Duration::from_millis(600));
        state.sync_connection();
        assert!(state.is_connected());
        assert!(state.read().is_ok());
        state.disconnect();
    }
}
