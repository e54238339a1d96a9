use crate::aprs::{CallSsid, Phg, Position, Ssid, Symbol};
use crate::device_config::RunModes;
use crate::error::{ConfigToolError, ToolResult};

/// Which command a reply line answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    MyCall,
    MySsid,
    Dest,
    Path,
    Location,
    Symbol,
    Comments,
    Mode,
    SmartBeacon,
    FixedLocation,
    Phg,
    SendOk,
    TestStarted,
    Restarting,
}

/// One decoded line of device console output
#[derive(Debug, Clone, PartialEq)]
pub enum AtResponse {
    MyCall(CallSsid),
    MySsid(Ssid),
    Dest(CallSsid),
    Path(Vec<CallSsid>),
    Location(Position),
    Symbol(Symbol),
    Comments(String),
    Mode(RunModes),
    SmartBeacon(bool),
    FixedLocation(bool),
    Phg(Phg),
    SendOk,
    TestStarted(u8),
    Restarting { cleared: bool },
    InvalidValue,
    UnknownCommand(String),
    InvalidCommand(String),
    /// Anything without a known reply prefix (banner, help text, debug output)
    Text(String),
}

impl AtResponse {
    pub fn kind(&self) -> Option<ReplyKind> {
        match self {
            AtResponse::MyCall(_) => Some(ReplyKind::MyCall),
            AtResponse::MySsid(_) => Some(ReplyKind::MySsid),
            AtResponse::Dest(_) => Some(ReplyKind::Dest),
            AtResponse::Path(_) => Some(ReplyKind::Path),
            AtResponse::Location(_) => Some(ReplyKind::Location),
            AtResponse::Symbol(_) => Some(ReplyKind::Symbol),
            AtResponse::Comments(_) => Some(ReplyKind::Comments),
            AtResponse::Mode(_) => Some(ReplyKind::Mode),
            AtResponse::SmartBeacon(_) => Some(ReplyKind::SmartBeacon),
            AtResponse::FixedLocation(_) => Some(ReplyKind::FixedLocation),
            AtResponse::Phg(_) => Some(ReplyKind::Phg),
            AtResponse::SendOk => Some(ReplyKind::SendOk),
            AtResponse::TestStarted(_) => Some(ReplyKind::TestStarted),
            AtResponse::Restarting { .. } => Some(ReplyKind::Restarting),
            AtResponse::InvalidValue
            | AtResponse::UnknownCommand(_)
            | AtResponse::InvalidCommand(_)
            | AtResponse::Text(_) => None,
        }
    }

    /// Human readable reason when the device refused a command
    pub fn rejection(&self) -> Option<String> {
        match self {
            AtResponse::InvalidValue => Some("invalid value".to_string()),
            AtResponse::UnknownCommand(cmd) => Some(format!("unknown command {cmd}")),
            AtResponse::InvalidCommand(cmd) => Some(format!("invalid command {cmd}")),
            _ => None,
        }
    }
}

/// Parse a single console line (without its line ending)
pub fn parse_response(line: &str) -> ToolResult<AtResponse> {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(value) = line.strip_prefix("MYCALL:") {
        return Ok(AtResponse::MyCall(parse_field(value, "MYCALL")?));
    }
    if let Some(value) = line.strip_prefix("MY_SSID:") {
        return Ok(AtResponse::MySsid(parse_field(value, "MY_SSID")?));
    }
    if let Some(value) = line.strip_prefix("DEST:") {
        return Ok(AtResponse::Dest(parse_field(value, "DEST")?));
    }
    if let Some(value) = line.strip_prefix("PATH:") {
        return parse_path(value).map(AtResponse::Path);
    }
    if let Some(value) = line.strip_prefix("Location:") {
        return Position::from_aprs(value).map(AtResponse::Location);
    }
    if let Some(value) = line.strip_prefix("SYMBL:") {
        // the code can itself be a space, so only the separator is dropped
        let value = value.strip_prefix(' ').unwrap_or(value);
        return value
            .parse()
            .map(AtResponse::Symbol)
            .map_err(|e| ConfigToolError::parse(format!("SYMBL reply: {e}")));
    }
    if let Some(value) = line.strip_prefix('>') {
        return Ok(AtResponse::Comments(value.to_string()));
    }
    if let Some(value) = line.strip_prefix("MODE:") {
        let bits: u8 = parse_number(value, "MODE")?;
        return RunModes::from_bits(bits).map(AtResponse::Mode);
    }
    if let Some(value) = line.strip_prefix("SMART:") {
        return parse_flag(value, "SMART").map(AtResponse::SmartBeacon);
    }
    if let Some(value) = line.strip_prefix("FIXLOC:") {
        return parse_flag(value, "FIXLOC").map(AtResponse::FixedLocation);
    }
    if let Some(value) = line.strip_prefix("PHG:") {
        return value.parse().map(AtResponse::Phg);
    }
    if line == "SEND OK" {
        return Ok(AtResponse::SendOk);
    }
    if let Some(rest) = line.strip_prefix("Sending ") {
        if let Some(count) = rest.strip_suffix(" test packet...") {
            return Ok(AtResponse::TestStarted(parse_number(count, "test count")?));
        }
    }
    if line.ends_with("Restarting...") {
        return Ok(AtResponse::Restarting {
            cleared: line.starts_with("Settings cleared"),
        });
    }
    if line == "INVALID CMD VALUE" {
        return Ok(AtResponse::InvalidValue);
    }
    if let Some(cmd) = line.strip_prefix("UNKNOWN CMD: ") {
        return Ok(AtResponse::UnknownCommand(cmd.to_string()));
    }
    if let Some(cmd) = line.strip_prefix("INVALID CMD: ") {
        return Ok(AtResponse::InvalidCommand(cmd.to_string()));
    }

    Ok(AtResponse::Text(line.to_string()))
}

fn parse_field<T>(value: &str, name: &str) -> ToolResult<T>
where
    T: std::str::FromStr<Err = ConfigToolError>,
{
    value
        .trim()
        .parse()
        .map_err(|e: ConfigToolError| ConfigToolError::parse(format!("{name} reply '{}': {e}", value.trim())))
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str) -> ToolResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigToolError::parse(format!("{name} value '{}' is not a number", value.trim())))
}

fn parse_flag(value: &str, name: &str) -> ToolResult<bool> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(ConfigToolError::parse(format!("{name} value '{other}' is not 0 or 1"))),
    }
}

fn parse_path(value: &str) -> ToolResult<Vec<CallSsid>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|hop| parse_field(hop, "PATH"))
        .collect()
}
