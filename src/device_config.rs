//! The configuration record exchanged with a TinyAPRS device

use crate::aprs::{CallSsid, Callsign, Phg, Position, Ssid, Symbol};
use crate::aprs::symbol::PRIMARY_TABLE;
use crate::config::{
    DEFAULT_CALLSIGN, DEFAULT_DESTINATION, DEFAULT_ICON, DEFAULT_PATH, DEFAULT_SSID,
    MAX_COMMENT_LEN, MAX_PATH_ENTRIES,
};
use crate::error::{ConfigToolError, ToolResult};

/// Operating modes; each can be enabled independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunModes {
    pub kiss: bool,
    pub digi: bool,
    pub tracker: bool,
}

impl RunModes {
    const KISS_BIT: u8 = 0x01;
    const DIGI_BIT: u8 = 0x02;
    const TRACKER_BIT: u8 = 0x04;

    pub fn from_bits(bits: u8) -> ToolResult<Self> {
        if bits & !(Self::KISS_BIT | Self::DIGI_BIT | Self::TRACKER_BIT) != 0 {
            return Err(ConfigToolError::parse(format!("mode bits {bits:#04x} out of range")));
        }
        Ok(Self {
            kiss: bits & Self::KISS_BIT != 0,
            digi: bits & Self::DIGI_BIT != 0,
            tracker: bits & Self::TRACKER_BIT != 0,
        })
    }

    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.kiss {
            bits |= Self::KISS_BIT;
        }
        if self.digi {
            bits |= Self::DIGI_BIT;
        }
        if self.tracker {
            bits |= Self::TRACKER_BIT;
        }
        bits
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    pub callsign: Callsign,
    pub ssid: Ssid,
    pub position: Position,
    pub modes: RunModes,
    pub smart_beacon: bool,
    pub fixed_location: bool,
    /// Beacon comment text
    pub comment: String,
    pub symbol: Symbol,
    pub phg: Phg,
    pub destination: CallSsid,
    pub path: Vec<CallSsid>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            callsign: Callsign(DEFAULT_CALLSIGN.to_string()),
            ssid: Ssid(DEFAULT_SSID),
            position: Position {
                latitude: 30.123456,
                longitude: 120.123456,
            },
            modes: RunModes::default(),
            smart_beacon: false,
            fixed_location: false,
            comment: crate::config::DEFAULT_BEACON_TEXT.to_string(),
            symbol: Symbol {
                table: PRIMARY_TABLE,
                code: DEFAULT_ICON,
            },
            phg: Phg::default(),
            destination: CallSsid::new(Callsign(DEFAULT_DESTINATION.to_string()), Ssid(0)),
            path: DEFAULT_PATH
                .iter()
                .filter_map(|hop| hop.split_once('-'))
                .map(|(call, ssid)| {
                    CallSsid::new(Callsign(call.to_string()), Ssid(ssid.parse().unwrap_or(0)))
                })
                .collect(),
        }
    }
}

impl DeviceConfig {
    pub fn my_call(&self) -> CallSsid {
        CallSsid::new(self.callsign.clone(), self.ssid)
    }

    /// Checks the free-form fields that the typed fields cannot guarantee
    pub fn validate(&self) -> ToolResult<()> {
        validate_comment(&self.comment)?;
        validate_path(&self.path)?;
        Ok(())
    }
}

/// Non-empty printable ASCII, no `=` (the device splits commands on it),
/// bounded by the device's console line length. `AT+CMNTS=` with nothing
/// after it is a query, so an empty comment cannot be written.
pub fn validate_comment(text: &str) -> ToolResult<()> {
    if text.trim().is_empty() {
        return Err(ConfigToolError::validation("beacon text", "must not be empty"));
    }
    if text.len() > MAX_COMMENT_LEN {
        return Err(ConfigToolError::validation(
            "beacon text",
            format!("{} characters, at most {MAX_COMMENT_LEN} allowed", text.len()),
        ));
    }
    if let Some(c) = text.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(ConfigToolError::validation(
            "beacon text",
            format!("'{}' is not printable ASCII", c.escape_default()),
        ));
    }
    if text.contains('=') {
        return Err(ConfigToolError::validation("beacon text", "'=' is not allowed"));
    }
    Ok(())
}

pub fn validate_path(path: &[CallSsid]) -> ToolResult<()> {
    if path.len() > MAX_PATH_ENTRIES {
        return Err(ConfigToolError::validation(
            "path",
            format!("{} hops, at most {MAX_PATH_ENTRIES} allowed", path.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_form_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.my_call().to_string(), "BG5HHP-1");
        assert_eq!(config.position.latitude_text(), "30.123456N");
        assert_eq!(config.position.longitude_text(), "120.123456E");
        assert_eq!(config.comment, "APTI01 Beacon 431.040 Happy New Year!");
        assert_eq!(config.symbol.icon_text(), "r");
        assert_eq!(config.modes, RunModes::default());
        assert!(!config.smart_beacon && !config.fixed_location);
        assert_eq!(config.destination.to_string(), "APTB01");
        let path: Vec<String> = config.path.iter().map(ToString::to_string).collect();
        assert_eq!(path, ["WIDE1-1", "WIDE2-2"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn run_mode_bits_round_trip() {
        let modes = RunModes {
            kiss: true,
            digi: false,
            tracker: true,
        };
        assert_eq!(modes.bits(), 5);
        assert_eq!(RunModes::from_bits(5).unwrap(), modes);
        assert!(RunModes::from_bits(8).is_err());
    }

    #[test]
    fn comment_rules() {
        assert!(validate_comment("").is_err());
        assert!(validate_comment("   ").is_err());
        assert!(validate_comment("Rolling 3.6V").is_ok());
        assert!(validate_comment("a=b").is_err());
        assert!(validate_comment("tab\there").is_err());
        assert!(validate_comment("caf\u{e9}").is_err());
        assert!(validate_comment(&"x".repeat(MAX_COMMENT_LEN + 1)).is_err());
    }

    #[test]
    fn path_is_limited_to_two_hops() {
        let mut config = DeviceConfig::default();
        config.path.push("WIDE3-3".parse().unwrap());
        assert!(config.validate().is_err());
    }
}
