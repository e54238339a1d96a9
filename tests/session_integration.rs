use std::time::{Duration, Instant};

use tinyaprs_config::app::AppState;
use tinyaprs_config::device_config::{DeviceConfig, RunModes};
use tinyaprs_config::error::ConfigToolError;
use tinyaprs_config::form::FormFields;
use tinyaprs_config::session::{DeviceSession, SessionOptions};
use tinyaprs_config::transport::SimulatedDevice;

fn fast_options() -> SessionOptions {
    SessionOptions {
        response_timeout: Duration::from_millis(300),
        command_delay: Duration::ZERO,
        idle_gap: Duration::from_millis(20),
    }
}

fn session_for(device: &SimulatedDevice) -> DeviceSession {
    DeviceSession::with_options(Box::new(device.clone()), fast_options())
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn test_read_returns_device_configuration() {
    let device = SimulatedDevice::default();
    let mut session = session_for(&device);

    let mut steps = Vec::new();
    let config = session.read_config(|p| steps.push(p)).unwrap();

    assert_eq!(config.my_call().to_string(), "BG5HHP-1");
    assert_eq!(config.destination.to_string(), "APTB01");
    assert_eq!(config.path.len(), 2);
    assert_eq!(steps.last(), Some(&100));
    assert!(steps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_form_save_then_read_back() {
    let device = SimulatedDevice::default();
    let mut session = session_for(&device);

    let form = FormFields {
        callsign: "N0CALL".into(),
        ssid: "9".into(),
        latitude: "45.5".into(),
        longitude: "-122.25".into(),
        tracker: true,
        smart_beacon: true,
        beacon_text: "MOBILE 146.520".into(),
        path: "WIDE1-1,WIDE2-1".into(),
        ..Default::default()
    };
    let config = form.to_config().unwrap();
    session.save_config(&config, |_| {}).unwrap();

    let stored = device.config();
    assert_eq!(stored.my_call().to_string(), "N0CALL-9");
    assert_eq!(stored.comment, "MOBILE 146.520");
    assert!(stored.smart_beacon);
    assert_eq!(
        stored.modes,
        RunModes {
            kiss: false,
            digi: false,
            tracker: true
        }
    );

    let read_back = session.read_config(|_| {}).unwrap();
    assert_eq!(read_back.my_call(), config.my_call());
    assert_eq!(read_back.path, config.path);
    assert!((read_back.position.latitude - 45.5).abs() < 0.001);
    assert!((read_back.position.longitude + 122.25).abs() < 0.001);

    let mut refreshed = FormFields::default();
    refreshed.apply_config(&read_back);
    assert_eq!(refreshed.callsign, "N0CALL");
    assert_eq!(refreshed.ssid, "9");
    assert!(refreshed.tracker);
}

#[test]
fn test_invalid_form_never_reaches_device() {
    let form = FormFields {
        callsign: "".into(),
        ..Default::default()
    };
    assert!(matches!(form.to_config(), Err(ConfigToolError::Validation { .. })));
}

#[test]
fn test_silent_device_times_out() {
    let device = SimulatedDevice::default();
    device.set_silent(true);
    let mut session = session_for(&device);

    let err = session.read_config(|_| {}).unwrap_err();
    assert!(matches!(err, ConfigToolError::Timeout(_)));
}

#[test]
fn test_raw_command_returns_reply_lines() {
    let device = SimulatedDevice::default();
    let mut session = session_for(&device);

    let lines = session.send_raw("at+mycall").unwrap();
    assert_eq!(lines, ["MYCALL: BG5HHP-1"]);
}

#[test]
fn test_app_state_reads_through_worker() {
    let device = SimulatedDevice::new(DeviceConfig {
        comment: "HELLO".into(),
        ..Default::default()
    });
    let mut state = AppState::default();
    state.attach(session_for(&device));
    assert!(state.is_connected());

    state.read().unwrap();
    assert!(wait_until(|| state.apply_loaded_config()));
    assert_eq!(state.form.beacon_text, "HELLO");

    state.disconnect();
    assert!(!state.is_connected());
}
