//! Station coordinates
//!
//! The form edits decimal degrees with a hemisphere suffix (`30.123456N`).
//! The device stores APRS degrees-and-minutes (`3007.41N/12007.41E`).

use std::fmt;

use crate::error::{ConfigToolError, ToolResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Decimal degrees, north positive
    pub latitude: f64,
    /// Decimal degrees, east positive
    pub longitude: f64,
}

#[derive(Clone, Copy)]
struct AxisFormat {
    field: &'static str,
    limit: f64,
    degree_digits: usize,
    positive: char,
    negative: char,
}

const LATITUDE: AxisFormat = AxisFormat {
    field: "latitude",
    limit: 90.0,
    degree_digits: 2,
    positive: 'N',
    negative: 'S',
};

const LONGITUDE: AxisFormat = AxisFormat {
    field: "longitude",
    limit: 180.0,
    degree_digits: 3,
    positive: 'E',
    negative: 'W',
};

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> ToolResult<Self> {
        check_range(latitude, LATITUDE)?;
        check_range(longitude, LONGITUDE)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse the form's two decimal-degree fields
    pub fn from_decimal(latitude: &str, longitude: &str) -> ToolResult<Self> {
        Self::new(
            parse_decimal(latitude, LATITUDE)?,
            parse_decimal(longitude, LONGITUDE)?,
        )
    }

    pub fn latitude_text(&self) -> String {
        format_decimal(self.latitude, LATITUDE)
    }

    pub fn longitude_text(&self) -> String {
        format_decimal(self.longitude, LONGITUDE)
    }

    /// `DDMM.mmN/DDDMM.mmE`
    pub fn to_aprs(&self) -> String {
        format!(
            "{}/{}",
            format_aprs(self.latitude, LATITUDE),
            format_aprs(self.longitude, LONGITUDE)
        )
    }

    /// Accepts `/` or `,` between the two halves
    pub fn from_aprs(text: &str) -> ToolResult<Self> {
        let text = text.trim();
        let (lat, lon) = text
            .split_once(['/', ','])
            .ok_or_else(|| ConfigToolError::parse(format!("location '{text}' has no separator")))?;
        Self::new(parse_aprs(lat, LATITUDE)?, parse_aprs(lon, LONGITUDE)?)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.latitude_text(), self.longitude_text())
    }
}

fn check_range(value: f64, axis: AxisFormat) -> ToolResult<()> {
    if !value.is_finite() || value.abs() > axis.limit {
        return Err(ConfigToolError::validation(
            axis.field,
            format!("{value} is outside -{0}..{0}", axis.limit),
        ));
    }
    Ok(())
}

fn parse_decimal(text: &str, axis: AxisFormat) -> ToolResult<f64> {
    let upper = text.trim().to_ascii_uppercase();
    let invalid = || ConfigToolError::validation(axis.field, format!("'{}' is not a coordinate", text.trim()));

    let (number, sign) = match upper.chars().last() {
        Some(c) if c == axis.positive => (&upper[..upper.len() - 1], 1.0),
        Some(c) if c == axis.negative => (&upper[..upper.len() - 1], -1.0),
        Some(_) => (upper.as_str(), 1.0),
        None => return Err(invalid()),
    };

    let value: f64 = number.trim().parse().map_err(|_| invalid())?;
    if sign < 0.0 && value < 0.0 {
        return Err(invalid());
    }

    let value = value * sign;
    check_range(value, axis)?;
    Ok(value)
}

fn format_decimal(value: f64, axis: AxisFormat) -> String {
    let hemisphere = if value < 0.0 { axis.negative } else { axis.positive };
    format!("{:.6}{hemisphere}", value.abs())
}

fn format_aprs(value: f64, axis: AxisFormat) -> String {
    let hemisphere = if value < 0.0 { axis.negative } else { axis.positive };
    // hundredths of a minute, so rounding carries into the degrees
    let total = (value.abs() * 6000.0).round() as u64;
    let degrees = total / 6000;
    let hundredths = total % 6000;
    format!(
        "{degrees:0width$}{:02}.{:02}{hemisphere}",
        hundredths / 100,
        hundredths % 100,
        width = axis.degree_digits
    )
}

fn parse_aprs(text: &str, axis: AxisFormat) -> ToolResult<f64> {
    let text = text.trim();
    let malformed = || ConfigToolError::parse(format!("{} '{text}' is not DDMM.mm format", axis.field));

    let hemisphere = text.chars().last().ok_or_else(malformed)?;
    let sign = if hemisphere == axis.positive {
        1.0
    } else if hemisphere == axis.negative {
        -1.0
    } else {
        return Err(malformed());
    };

    let digits = &text[..text.len() - 1];
    if digits.len() <= axis.degree_digits || !digits.is_char_boundary(axis.degree_digits) {
        return Err(malformed());
    }
    let (degrees, minutes) = digits.split_at(axis.degree_digits);
    let degrees: u32 = degrees.parse().map_err(|_| malformed())?;
    let minutes: f64 = minutes.parse().map_err(|_| malformed())?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(malformed());
    }

    let value = sign * (degrees as f64 + minutes / 60.0);
    check_range(value, axis).map_err(|e| ConfigToolError::parse(e.to_string()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_coordinates_convert_to_aprs() {
        let pos = Position::from_decimal("30.123456N", "120.123456E").unwrap();
        assert_eq!(pos.to_aprs(), "3007.41N/12007.41E");
    }

    #[test]
    fn southern_and_western_hemispheres_are_negative() {
        let pos = Position::from_decimal("33.8688s", "151.2093W").unwrap();
        assert!(pos.latitude < 0.0);
        assert!(pos.longitude < 0.0);
        assert_eq!(pos.latitude_text(), "33.868800S");
        assert_eq!(pos.longitude_text(), "151.209300W");

        let signed = Position::from_decimal("-33.8688", "-151.2093").unwrap();
        assert_eq!(signed, pos);
    }

    #[test]
    fn rounding_carries_into_degrees() {
        let pos = Position::new(30.99999, 9.99999).unwrap();
        assert_eq!(pos.to_aprs(), "3100.00N/01000.00E");
    }

    #[test]
    fn device_location_parses_to_decimal() {
        let pos = Position::from_aprs("3014.00N/12009.00E").unwrap();
        assert_eq!(pos.latitude_text(), "30.233333N");
        assert_eq!(pos.longitude_text(), "120.150000E");

        let comma = Position::from_aprs("3014.00N,12009.00E").unwrap();
        assert_eq!(comma, pos);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(Position::from_decimal("91.0N", "0E").is_err());
        assert!(Position::from_decimal("0N", "180.5E").is_err());
        assert!(Position::from_decimal("-10S", "0E").is_err());
        assert!(Position::from_decimal("abc", "0E").is_err());
    }

    #[test]
    fn malformed_device_location_is_a_parse_error() {
        let err = Position::from_aprs("3014.00X/12009.00E").unwrap_err();
        assert!(matches!(err, ConfigToolError::Parse(_)));
        assert!(Position::from_aprs("3075.00N/12009.00E").is_err());
        assert!(Position::from_aprs("3014.00N").is_err());
    }
}
