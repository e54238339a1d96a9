//! DeviceSession: owns a link and drives the AT console exchange.
//!
//! Encoding and decoding live in `protocol` / `parser`; this module only
//! handles timing: command spacing, line assembly and deadlines.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::{INTER_COMMAND_DELAY_MS, RAW_IDLE_GAP_MS, SERIAL_READ_TIMEOUT_MS};
use crate::device_config::DeviceConfig;
use crate::error::{ConfigToolError, ToolResult};
use crate::parser::{AtResponse, ReplyKind, parse_response};
use crate::protocol::AtCommand;
use crate::transport::SerialLink;

const READ_CHUNK_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// How long to wait for a reply before giving up
    pub response_timeout: Duration,
    /// Minimum spacing between consecutive commands
    pub command_delay: Duration,
    /// Quiet period that ends a free-form reply
    pub idle_gap: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_millis(SERIAL_READ_TIMEOUT_MS),
            command_delay: Duration::from_millis(INTER_COMMAND_DELAY_MS),
            idle_gap: Duration::from_millis(RAW_IDLE_GAP_MS),
        }
    }
}

/// One line of traffic in either direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traffic {
    Sent(String),
    Received(String),
}

pub struct DeviceSession {
    link: Box<dyn SerialLink>,
    options: SessionOptions,
    partial: Vec<u8>,
    lines: VecDeque<String>,
    traffic: Vec<Traffic>,
    last_command_time: Option<Instant>,
}

impl DeviceSession {
    pub fn new(link: Box<dyn SerialLink>) -> Self {
        Self::with_options(link, SessionOptions::default())
    }

    pub fn with_options(link: Box<dyn SerialLink>, options: SessionOptions) -> Self {
        Self {
            link,
            options,
            partial: Vec::new(),
            lines: VecDeque::new(),
            traffic: Vec::new(),
            last_command_time: None,
        }
    }

    pub fn port_name(&self) -> &str {
        self.link.port_name()
    }

    /// Everything sent and received since the last call
    pub fn take_traffic(&mut self) -> Vec<Traffic> {
        std::mem::take(&mut self.traffic)
    }

    /// Send a command and wait for the line that answers it.
    ///
    /// Commands without a dedicated reply (`?`, raw text) return the
    /// collected lines as one `Text` response; `AT+KISS=1` returns at once
    /// because the console goes quiet after it.
    pub fn execute(&mut self, cmd: &AtCommand) -> ToolResult<AtResponse> {
        let Some(expected) = cmd.reply_kind() else {
            self.send(cmd)?;
            if matches!(cmd, AtCommand::Kiss) {
                return Ok(AtResponse::Text(String::new()));
            }
            let lines = self.collect_reply();
            self.last_command_time = Some(Instant::now());
            return lines.map(|lines| AtResponse::Text(lines.join("\n")));
        };

        self.send(cmd)?;
        let result = self.await_reply(cmd, expected);
        // Stamp even on error so the next command still respects the delay
        self.last_command_time = Some(Instant::now());
        result
    }

    /// Write a command without waiting for anything
    pub fn send(&mut self, cmd: &AtCommand) -> ToolResult<()> {
        self.ensure_command_delay();

        // Anything still buffered is unsolicited; it has already been
        // recorded as traffic and must not be mistaken for the reply.
        self.lines.clear();

        let line = cmd.to_ascii();
        log::debug!("TX: {line}");
        self.link.write_all(cmd.to_wire().as_bytes())?;
        self.traffic.push(Traffic::Sent(line));
        self.last_command_time = Some(Instant::now());
        Ok(())
    }

    /// Write free-form console text and collect the reply lines.
    pub fn send_raw(&mut self, text: &str) -> ToolResult<Vec<String>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ConfigToolError::validation("console command", "must not be empty"));
        }
        self.send(&AtCommand::Raw(text.to_string()))?;
        let lines = self.collect_reply();
        self.last_command_time = Some(Instant::now());
        lines
    }

    /// Complete lines that arrived while no request was running
    pub fn drain_unsolicited(&mut self) -> ToolResult<Vec<String>> {
        self.poll_lines()?;
        Ok(self.lines.drain(..).collect())
    }

    /// Query every setting and assemble the device configuration.
    /// `progress` receives the completed percentage after each step.
    pub fn read_config(&mut self, mut progress: impl FnMut(u8)) -> ToolResult<DeviceConfig> {
        let queries = [
            AtCommand::MyCall(None),
            AtCommand::Dest(None),
            AtCommand::Path(None),
            AtCommand::Location(None),
            AtCommand::Symbol(None),
            AtCommand::Comments(None),
            AtCommand::Mode(None),
            AtCommand::SmartBeacon(None),
            AtCommand::FixedLocation(None),
            AtCommand::Phg(None),
        ];

        let mut config = DeviceConfig::default();
        let total = queries.len();
        for (step, query) in queries.iter().enumerate() {
            let response = self.execute(query)?;
            apply_reply(&mut config, response);
            progress(percent(step + 1, total));
        }

        log::info!("Read configuration for {}", config.my_call());
        Ok(config)
    }

    /// Write every setting and check the device echoes it back
    pub fn save_config(&mut self, config: &DeviceConfig, mut progress: impl FnMut(u8)) -> ToolResult<()> {
        config.validate()?;

        let commands = set_commands(config);
        let total = commands.len();
        for (step, cmd) in commands.iter().enumerate() {
            let response = self.execute(cmd)?;
            if !echoes(cmd, &response) {
                return Err(ConfigToolError::Rejected {
                    command: cmd.to_ascii(),
                    reason: format!("device reports {}", describe(&response)),
                });
            }
            progress(percent(step + 1, total));
        }

        log::info!("Saved configuration for {}", config.my_call());
        Ok(())
    }

    fn await_reply(&mut self, cmd: &AtCommand, expected: ReplyKind) -> ToolResult<AtResponse> {
        let deadline = Instant::now() + self.options.response_timeout;

        while let Some(line) = self.next_line(deadline)? {
            let response = parse_response(&line)?;
            if let Some(reason) = response.rejection() {
                return Err(ConfigToolError::Rejected {
                    command: cmd.to_ascii(),
                    reason,
                });
            }
            if response.kind() == Some(expected) {
                return Ok(response);
            }
            log::debug!("Ignoring unrelated line: {line}");
        }

        log::warn!("No reply to '{}'", cmd.to_ascii());
        Err(ConfigToolError::Timeout(self.options.response_timeout))
    }

    /// Lines until the device goes quiet for the idle gap
    fn collect_reply(&mut self) -> ToolResult<Vec<String>> {
        let deadline = Instant::now() + self.options.response_timeout;
        let mut lines = Vec::new();
        let mut last_activity: Option<Instant> = None;

        loop {
            lines.extend(self.lines.drain(..));

            let now = Instant::now();
            if last_activity.is_some_and(|t| now.duration_since(t) >= self.options.idle_gap) || now >= deadline {
                break;
            }
            if self.poll_lines()? {
                last_activity = Some(Instant::now());
            }
        }
        lines.extend(self.lines.drain(..));

        // Output without a line ending (e.g. a firmware stub message)
        if !self.partial.is_empty() {
            let line = String::from_utf8_lossy(&self.partial).trim().to_string();
            self.partial.clear();
            if !line.is_empty() {
                self.traffic.push(Traffic::Received(line.clone()));
                lines.push(line);
            }
        }

        if last_activity.is_none() {
            return Err(ConfigToolError::Timeout(self.options.response_timeout));
        }
        Ok(lines)
    }

    fn next_line(&mut self, deadline: Instant) -> ToolResult<Option<String>> {
        loop {
            if let Some(line) = self.lines.pop_front() {
                return Ok(Some(line));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            self.poll_lines()?;
        }
    }

    /// One read from the link; complete lines are queued. Returns whether
    /// any bytes arrived.
    fn poll_lines(&mut self) -> ToolResult<bool> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let n = self.link.read(&mut chunk)?;
        if n == 0 {
            return Ok(false);
        }

        for &byte in &chunk[..n] {
            match byte {
                b'\r' | b'\n' => {
                    if self.partial.is_empty() {
                        continue;
                    }
                    let line = String::from_utf8_lossy(&self.partial).into_owned();
                    self.partial.clear();
                    log::debug!("RX: {line}");
                    self.traffic.push(Traffic::Received(line.clone()));
                    self.lines.push_back(line);
                }
                _ => self.partial.push(byte),
            }
        }
        Ok(true)
    }

    fn ensure_command_delay(&self) {
        if let Some(last) = self.last_command_time {
            let elapsed = last.elapsed();
            if elapsed < self.options.command_delay {
                std::thread::sleep(self.options.command_delay - elapsed);
            }
        }
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done * 100) / total).min(100) as u8
}

fn apply_reply(config: &mut DeviceConfig, response: AtResponse) {
    match response {
        AtResponse::MyCall(call) => {
            config.callsign = call.call;
            config.ssid = call.ssid;
        }
        AtResponse::MySsid(ssid) => config.ssid = ssid,
        AtResponse::Dest(call) => config.destination = call,
        AtResponse::Path(path) => config.path = path,
        AtResponse::Location(position) => config.position = position,
        AtResponse::Symbol(symbol) => config.symbol = symbol,
        AtResponse::Comments(text) => config.comment = text,
        AtResponse::Mode(modes) => config.modes = modes,
        AtResponse::SmartBeacon(on) => config.smart_beacon = on,
        AtResponse::FixedLocation(on) => config.fixed_location = on,
        AtResponse::Phg(phg) => config.phg = phg,
        other => log::debug!("Reply carries no setting: {other:?}"),
    }
}

fn set_commands(config: &DeviceConfig) -> Vec<AtCommand> {
    let mut commands = vec![
        AtCommand::MyCall(Some(config.my_call())),
        AtCommand::Dest(Some(config.destination.clone())),
    ];
    // the console has no way to clear the path
    if !config.path.is_empty() {
        commands.push(AtCommand::Path(Some(config.path.clone())));
    }
    commands.extend([
        AtCommand::Location(Some(config.position)),
        AtCommand::Symbol(Some(config.symbol)),
        AtCommand::Comments(Some(config.comment.clone())),
        AtCommand::Mode(Some(config.modes)),
        AtCommand::SmartBeacon(Some(config.smart_beacon)),
        AtCommand::FixedLocation(Some(config.fixed_location)),
        AtCommand::Phg(Some(config.phg)),
    ]);
    commands
}

/// Whether the reply shows the value the command set.
/// The device upper-cases the whole line, so text compares case-insensitively.
fn echoes(cmd: &AtCommand, response: &AtResponse) -> bool {
    match (cmd, response) {
        (AtCommand::MyCall(Some(sent)), AtResponse::MyCall(got)) => sent == got,
        (AtCommand::Dest(Some(sent)), AtResponse::Dest(got)) => sent == got,
        (AtCommand::Path(Some(sent)), AtResponse::Path(got)) => sent == got,
        (AtCommand::Location(Some(sent)), AtResponse::Location(got)) => sent.to_aprs() == got.to_aprs(),
        (AtCommand::Symbol(Some(sent)), AtResponse::Symbol(got)) => {
            sent.to_wire().eq_ignore_ascii_case(&got.to_wire())
        }
        (AtCommand::Comments(Some(sent)), AtResponse::Comments(got)) => sent.eq_ignore_ascii_case(got),
        (AtCommand::Mode(Some(sent)), AtResponse::Mode(got)) => sent == got,
        (AtCommand::SmartBeacon(Some(sent)), AtResponse::SmartBeacon(got)) => sent == got,
        (AtCommand::FixedLocation(Some(sent)), AtResponse::FixedLocation(got)) => sent == got,
        (AtCommand::Phg(Some(sent)), AtResponse::Phg(got)) => sent == got,
        _ => false,
    }
}

fn describe(response: &AtResponse) -> String {
    match response {
        AtResponse::MyCall(call) | AtResponse::Dest(call) => call.to_string(),
        AtResponse::Path(path) => crate::protocol::join_path(path),
        AtResponse::Location(position) => position.to_aprs(),
        AtResponse::Symbol(symbol) => symbol.to_wire(),
        AtResponse::Comments(text) => format!("'{text}'"),
        AtResponse::Mode(modes) => modes.bits().to_string(),
        AtResponse::Phg(phg) => phg.to_wire(),
        other => format!("{other:?}"),
    }
}
