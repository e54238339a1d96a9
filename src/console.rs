use chrono::{DateTime, Local};
use std::collections::VecDeque;

use crate::config::MAX_CONSOLE_LINES;
use crate::device_config::DeviceConfig;
use crate::error::ConfigToolError;
use crate::session::Traffic;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Sent,
    Received,
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct ConsoleLine {
    pub clock_time: DateTime<Local>,
    pub kind: LineKind,
    pub text: String,
}

/// Shared between the device worker and the UI.
/// The worker writes results here; the UI reads it every frame.
pub struct ConsoleBuffer {
    pub lines: VecDeque<ConsoleLine>,
    pub status: String,
    /// 0.0 to 1.0
    pub progress: f32,
    pub busy: bool,
    connected_port: Option<String>,
    // bumped by every new link; older workers compare against it
    link_id: u64,
    loaded_config: Option<DeviceConfig>,
}

impl Default for ConsoleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleBuffer {
    pub fn new() -> Self {
        Self {
            lines: VecDeque::with_capacity(MAX_CONSOLE_LINES),
            status: "Disconnected.".to_string(),
            progress: 0.0,
            busy: false,
            connected_port: None,
            link_id: 0,
            loaded_config: None,
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn push(&mut self, kind: LineKind, text: impl Into<String>) {
        if self.lines.len() >= MAX_CONSOLE_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(ConsoleLine {
            clock_time: Local::now(),
            kind,
            text: text.into(),
        });
    }

    pub fn push_traffic(&mut self, traffic: Vec<Traffic>) {
        for item in traffic {
            match item {
                Traffic::Sent(text) => self.push(LineKind::Sent, text),
                Traffic::Received(text) => self.push(LineKind::Received, text),
            }
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(LineKind::Info, text);
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn set_progress(&mut self, percent: u8) {
        self.progress = f32::from(percent.min(100)) / 100.0;
    }

    /// Mark a device request as running
    pub fn begin(&mut self, status: impl Into<String>) {
        self.busy = true;
        self.progress = 0.0;
        self.set_status(status);
    }

    pub fn finish(&mut self, status: impl Into<String>) {
        self.busy = false;
        self.set_status(status);
    }

    /// Report a failed request in the status bar and the console
    pub fn fail(&mut self, error: &ConfigToolError) {
        let text = error.to_string();
        self.busy = false;
        self.push(LineKind::Error, text.clone());
        self.set_status(text);
    }

    pub fn connected_port(&self) -> Option<&str> {
        self.connected_port.as_deref()
    }

    /// Hand the console to a new link and return that link's id
    pub fn set_connected(&mut self, port: &str) -> u64 {
        self.link_id += 1;
        self.connected_port = Some(port.to_string());
        self.busy = false;
        self.progress = 0.0;
        self.loaded_config = None;
        self.set_status(format!("{port} Connected."));
        self.link_id
    }

    /// Whether `link_id` is still the most recent link
    pub fn owns_link(&self, link_id: u64) -> bool {
        self.link_id == link_id
    }

    pub fn set_disconnected(&mut self) {
        self.connected_port = None;
        self.busy = false;
        self.set_status("Disconnected.");
    }

    pub fn set_loaded_config(&mut self, config: DeviceConfig) {
        self.loaded_config = Some(config);
    }

    /// The configuration from the last successful read, once
    pub fn take_loaded_config(&mut self) -> Option<DeviceConfig> {
        self.loaded_config.take()
    }
}
