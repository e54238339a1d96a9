//! Station callsigns and SSIDs

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigToolError, ToolResult};

pub const MAX_CALLSIGN_LEN: usize = 6;
pub const MAX_SSID: u8 = 15;

/// Uppercase alphanumeric callsign, 1 to 6 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Callsign(pub(crate) String);

impl Callsign {
    pub fn new(text: &str) -> ToolResult<Self> {
        let call = text.trim().to_ascii_uppercase();

        if call.is_empty() {
            return Err(ConfigToolError::validation("callsign", "must not be empty"));
        }
        if call.len() > MAX_CALLSIGN_LEN {
            return Err(ConfigToolError::validation(
                "callsign",
                format!("'{call}' is longer than {MAX_CALLSIGN_LEN} characters"),
            ));
        }
        if !call.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigToolError::validation(
                "callsign",
                format!("'{call}' must contain only letters and digits"),
            ));
        }

        Ok(Self(call))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Callsign {
    type Err = ConfigToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Secondary station identifier, 0 to 15
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ssid(pub(crate) u8);

impl Ssid {
    pub fn new(value: u8) -> ToolResult<Self> {
        if value > MAX_SSID {
            return Err(ConfigToolError::validation(
                "SSID",
                format!("{value} is outside 0-{MAX_SSID}"),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl FromStr for Ssid {
    type Err = ConfigToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: u8 = trimmed.parse().map_err(|_| {
            ConfigToolError::validation("SSID", format!("'{trimmed}' is not a number"))
        })?;
        Self::new(value)
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A callsign with its SSID, written `CALL-SSID` (`CALL` alone when SSID is 0)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSsid {
    pub call: Callsign,
    pub ssid: Ssid,
}

impl CallSsid {
    pub fn new(call: Callsign, ssid: Ssid) -> Self {
        Self { call, ssid }
    }
}

impl FromStr for CallSsid {
    type Err = ConfigToolError;

    /// A trailing `*` (digipeated marker in device output) is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().trim_end_matches('*');
        match text.split_once('-') {
            Some((call, ssid)) => Ok(Self::new(call.parse()?, ssid.parse()?)),
            None => Ok(Self::new(text.parse()?, Ssid::default())),
        }
    }
}

impl fmt::Display for CallSsid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ssid.value() == 0 {
            write!(f, "{}", self.call)
        } else {
            write!(f, "{}-{}", self.call, self.ssid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callsign_is_uppercased() {
        let call = Callsign::new("bg5hhp").unwrap();
        assert_eq!(call.as_str(), "BG5HHP");
    }

    #[test]
    fn callsign_rejects_long_and_symbolic_input() {
        assert!(Callsign::new("BG5HHPX").is_err());
        assert!(Callsign::new("BG/HHP").is_err());
        assert!(Callsign::new("  ").is_err());
    }

    #[test]
    fn ssid_range_is_enforced() {
        assert_eq!(Ssid::new(15).unwrap().value(), 15);
        assert!(Ssid::new(16).is_err());
        assert!("x".parse::<Ssid>().is_err());
    }

    #[test]
    fn call_ssid_parses_with_and_without_suffix() {
        let full: CallSsid = "BG5HHP-1".parse().unwrap();
        assert_eq!(full.call.as_str(), "BG5HHP");
        assert_eq!(full.ssid.value(), 1);

        let bare: CallSsid = "APTB01".parse().unwrap();
        assert_eq!(bare.ssid.value(), 0);
        assert_eq!(bare.to_string(), "APTB01");
    }

    #[test]
    fn digipeated_marker_is_ignored() {
        let hop: CallSsid = "WIDE1-1*".parse().unwrap();
        assert_eq!(hop.to_string(), "WIDE1-1");
    }
}
