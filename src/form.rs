//! Editable form fields and their conversion to a device configuration

use crate::aprs::{CallSsid, Callsign, Phg, Position, Ssid, Symbol};
use crate::config::{
    DEFAULT_BEACON_TEXT, DEFAULT_CALLSIGN, DEFAULT_CONSOLE_COMMAND, DEFAULT_DESTINATION, DEFAULT_ICON,
    DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_PATH, DEFAULT_SSID,
};
use crate::device_config::{DeviceConfig, RunModes, validate_comment, validate_path};
use crate::error::ToolResult;
use crate::protocol::{DEFAULT_TEST_PACKETS, join_path};

/// Widget contents, kept as text until Save so the user can type freely
#[derive(Debug, Clone, PartialEq)]
pub struct FormFields {
    pub callsign: String,
    pub ssid: String,
    pub latitude: String,
    pub longitude: String,
    pub kiss: bool,
    pub digi: bool,
    pub tracker: bool,
    pub smart_beacon: bool,
    pub fixed_location: bool,
    // PHG digit codes; the combo boxes index into the APRS tables
    pub power: u8,
    pub height: u8,
    pub gain: u8,
    pub directivity: u8,
    pub icon: String,
    pub beacon_text: String,
    pub destination: String,
    /// Comma separated digipeater path
    pub path: String,
    pub console_command: String,
    pub test_packets: u8,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            callsign: DEFAULT_CALLSIGN.to_string(),
            ssid: DEFAULT_SSID.to_string(),
            latitude: DEFAULT_LATITUDE.to_string(),
            longitude: DEFAULT_LONGITUDE.to_string(),
            kiss: false,
            digi: false,
            tracker: false,
            smart_beacon: false,
            fixed_location: false,
            power: 0,
            height: 0,
            gain: 0,
            directivity: 0,
            icon: DEFAULT_ICON.to_string(),
            beacon_text: DEFAULT_BEACON_TEXT.to_string(),
            destination: DEFAULT_DESTINATION.to_string(),
            path: DEFAULT_PATH.join(","),
            console_command: DEFAULT_CONSOLE_COMMAND.to_string(),
            test_packets: DEFAULT_TEST_PACKETS,
        }
    }
}

impl FormFields {
    /// Validate every field and build the configuration to write.
    /// The first invalid field is reported.
    pub fn to_config(&self) -> ToolResult<DeviceConfig> {
        let callsign = Callsign::new(&self.callsign)?;
        let ssid: Ssid = self.ssid.parse()?;
        let position = Position::from_decimal(&self.latitude, &self.longitude)?;
        let symbol = Symbol::from_icon(&self.icon)?;
        validate_comment(&self.beacon_text)?;
        let phg = Phg::new(self.power, self.height, self.gain, self.directivity)?;
        let destination: CallSsid = self.destination.parse()?;
        let path = self
            .path
            .split(',')
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
            .map(str::parse)
            .collect::<ToolResult<Vec<CallSsid>>>()?;
        validate_path(&path)?;

        Ok(DeviceConfig {
            callsign,
            ssid,
            position,
            modes: RunModes {
                kiss: self.kiss,
                digi: self.digi,
                tracker: self.tracker,
            },
            smart_beacon: self.smart_beacon,
            fixed_location: self.fixed_location,
            comment: self.beacon_text.clone(),
            symbol,
            phg,
            destination,
            path,
        })
    }

    /// Fill the device fields from a configuration read from the device.
    /// Console and test-packet fields are left alone.
    pub fn apply_config(&mut self, config: &DeviceConfig) {
        self.callsign = config.callsign.to_string();
        self.ssid = config.ssid.to_string();
        self.latitude = config.position.latitude_text();
        self.longitude = config.position.longitude_text();
        self.kiss = config.modes.kiss;
        self.digi = config.modes.digi;
        self.tracker = config.modes.tracker;
        self.smart_beacon = config.smart_beacon;
        self.fixed_location = config.fixed_location;
        self.power = config.phg.power;
        self.height = config.phg.height;
        self.gain = config.phg.gain;
        self.directivity = config.phg.directivity;
        self.icon = config.symbol.icon_text();
        self.beacon_text = config.comment.clone();
        self.destination = config.destination.to_string();
        self.path = join_path(&config.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SERIAL_READ_TIMEOUT_MS, SERIAL_WRITE_TIMEOUT_MS};
    use crate::error::ConfigToolError;

    #[test]
    fn defaults_match_the_original_form() {
        let form = FormFields::default();
        assert_eq!(form.callsign, "BG5HHP");
        assert_eq!(form.ssid, "1");
        assert_eq!(form.latitude, "30.123456N");
        assert_eq!(form.longitude, "120.123456E");
        assert_eq!(form.beacon_text, "APTI01 Beacon 431.040 Happy New Year!");
        assert_eq!(form.console_command, "AT+HELP");
        assert_eq!(form.icon, "r");
        assert!(!form.kiss && !form.digi && !form.tracker);
        assert!(!form.smart_beacon && !form.fixed_location);
        assert_eq!((form.power, form.height, form.gain), (0, 0, 0));
        assert_eq!(SERIAL_READ_TIMEOUT_MS, 5000);
        assert_eq!(SERIAL_WRITE_TIMEOUT_MS, 5000);
    }

    #[test]
    fn default_form_converts_to_default_config() {
        let config = FormFields::default().to_config().unwrap();
        assert_eq!(config, DeviceConfig::default());
    }

    #[test]
    fn lowercase_callsign_is_accepted() {
        let form = FormFields {
            callsign: "bh4tdv".into(),
            ssid: "9".into(),
            ..FormFields::default()
        };
        assert_eq!(form.to_config().unwrap().my_call().to_string(), "BH4TDV-9");
    }

    #[test]
    fn invalid_fields_name_the_field() {
        let cases = [
            (FormFields { ssid: "16".into(), ..FormFields::default() }, "SSID"),
            (FormFields { latitude: "91N".into(), ..FormFields::default() }, "latitude"),
            (FormFields { icon: "".into(), ..FormFields::default() }, "icon"),
            (FormFields { beacon_text: "x=y".into(), ..FormFields::default() }, "beacon text"),
            (FormFields { path: "WIDE1-1,WIDE2-2,WIDE3-3".into(), ..FormFields::default() }, "path"),
        ];
        for (form, expected) in cases {
            match form.to_config() {
                Err(ConfigToolError::Validation { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {expected} validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_path_is_allowed() {
        let form = FormFields {
            path: " ".into(),
            ..FormFields::default()
        };
        assert!(form.to_config().unwrap().path.is_empty());
    }

    #[test]
    fn read_config_fills_the_form() {
        let mut config = DeviceConfig::default();
        config.callsign = "N0CALL".parse().unwrap();
        config.modes.digi = true;
        config.phg = Phg::new(3, 2, 6, 4).unwrap();
        config.path.truncate(1);

        let mut form = FormFields {
            console_command: "AT+PATH".into(),
            ..FormFields::default()
        };
        form.apply_config(&config);

        assert_eq!(form.callsign, "N0CALL");
        assert!(form.digi);
        assert_eq!((form.power, form.height, form.gain, form.directivity), (3, 2, 6, 4));
        assert_eq!(form.path, "WIDE1-1");
        assert_eq!(form.console_command, "AT+PATH");
        assert_eq!(form.to_config().unwrap(), config);
    }
}
