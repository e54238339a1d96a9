//! Power-Height-Gain-Directivity station descriptor
//!
//! Each property is a single digit on the air; the tables below map the
//! digit to its physical meaning.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigToolError, ToolResult};

pub const PHG_DIGITS: u8 = 10;
pub const MAX_DIRECTIVITY: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Phg {
    pub power: u8,
    pub height: u8,
    pub gain: u8,
    pub directivity: u8,
}

impl Phg {
    pub fn new(power: u8, height: u8, gain: u8, directivity: u8) -> ToolResult<Self> {
        for (field, digit) in [("power", power), ("height", height), ("antenna gain", gain)] {
            if digit >= PHG_DIGITS {
                return Err(ConfigToolError::validation(field, format!("code {digit} is not 0-9")));
            }
        }
        if directivity > MAX_DIRECTIVITY {
            return Err(ConfigToolError::validation(
                "directivity",
                format!("code {directivity} is not 0-{MAX_DIRECTIVITY}"),
            ));
        }
        Ok(Self {
            power,
            height,
            gain,
            directivity,
        })
    }

    pub fn to_wire(&self) -> String {
        format!("{}{}{}{}", self.power, self.height, self.gain, self.directivity)
    }
}

impl FromStr for Phg {
    type Err = ConfigToolError;

    /// Accepts `5130` or `PHG5130`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let digits = text.strip_prefix("PHG").unwrap_or(text);
        let values: Vec<u8> = digits
            .chars()
            .map(|c| c.to_digit(10).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(|| ConfigToolError::parse(format!("PHG '{text}' is not numeric")))?;

        match values.as_slice() {
            [p, h, g, d] => Self::new(*p, *h, *g, *d).map_err(|e| ConfigToolError::parse(e.to_string())),
            _ => Err(ConfigToolError::parse(format!("PHG '{text}' is not four digits"))),
        }
    }
}

impl fmt::Display for Phg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            power_label(self.power),
            height_label(self.height),
            gain_label(self.gain),
            directivity_label(self.directivity)
        )
    }
}

pub fn power_watts(code: u8) -> u32 {
    u32::from(code) * u32::from(code)
}

pub fn height_feet(code: u8) -> u32 {
    10u32 << code
}

pub fn power_label(code: u8) -> String {
    format!("{}W", power_watts(code))
}

pub fn height_label(code: u8) -> String {
    format!("{}ft", height_feet(code))
}

pub fn gain_label(code: u8) -> String {
    format!("{code}dB")
}

pub fn directivity_label(code: u8) -> String {
    if code == 0 {
        "omni".to_string()
    } else {
        format!("{}°", u32::from(code) * 45)
    }
}
