use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::thread;

use crate::console::{ConsoleBuffer, LineKind};
use crate::device_config::DeviceConfig;
use crate::error::{ConfigToolError, ToolResult};
use crate::parser::AtResponse;
use crate::protocol::AtCommand;
use crate::session::DeviceSession;
use crate::transport::SerialPortLink;

pub enum DeviceRequest {
    ReadConfig,
    SaveConfig(DeviceConfig),
    SendRaw(String),
    SendBeacon,
    SendTest(u8),
    EnterKiss,
    Reboot { clear: bool },
    Disconnect,
}

/// Open the port and hand it to a worker thread. Fails without spawning
/// anything when the port cannot be opened.
pub fn start_device_thread(
    port_path: &str,
    baud_rate: u32,
    console: Arc<Mutex<ConsoleBuffer>>,
) -> ToolResult<mpsc::Sender<DeviceRequest>> {
    let link = SerialPortLink::open(port_path, baud_rate)?;
    Ok(spawn_worker(DeviceSession::new(Box::new(link)), console))
}

pub fn spawn_worker(
    session: DeviceSession,
    console: Arc<Mutex<ConsoleBuffer>>,
) -> mpsc::Sender<DeviceRequest> {
    let link_id = console
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .set_connected(session.port_name());
    let console = LinkConsole { console, link_id };

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        device_loop(session, console, rx);
    });
    tx
}

/// A worker's view of the shared console. Once a newer link has claimed the
/// console, everything this worker still reports is dropped.
struct LinkConsole {
    console: Arc<Mutex<ConsoleBuffer>>,
    link_id: u64,
}

impl LinkConsole {
    fn update(&self, f: impl FnOnce(&mut ConsoleBuffer)) {
        let Ok(mut buf) = self.console.lock() else {
            return;
        };
        if buf.owns_link(self.link_id) {
            f(&mut buf);
        }
    }
}

fn device_loop(mut session: DeviceSession, console: LinkConsole, rx: mpsc::Receiver<DeviceRequest>) {
    let port = session.port_name().to_string();

    loop {
        // Check for requests (non-blocking)
        match rx.try_recv() {
            Ok(request) => {
                if !handle_request(&mut session, &console, request) {
                    break;
                }
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                log::info!("Request channel for {port} closed");
                console.update(|c| c.set_disconnected());
                break;
            }
            Err(mpsc::TryRecvError::Empty) => {}
        }

        // Boot banners and debug output while idle
        match session.drain_unsolicited() {
            Ok(lines) => {
                session.take_traffic();
                if !lines.is_empty() {
                    console.update(|c| {
                        for line in lines {
                            c.push(LineKind::Received, line);
                        }
                    });
                }
            }
            Err(e) => {
                log::error!("Lost serial link to {port}: {e}");
                console.update(|c| {
                    c.set_disconnected();
                    c.fail(&e);
                });
                break;
            }
        }
    }
    log::info!("Device thread for {port} exited");
}

/// Returns false when the link is closed and the loop should stop
fn handle_request(session: &mut DeviceSession, console: &LinkConsole, request: DeviceRequest) -> bool {
    let port = session.port_name().to_string();

    let (result, keep_open) = match request {
        DeviceRequest::ReadConfig => {
            console.update(|c| c.begin("Reading configuration..."));
            let result = session
                .read_config(|p| console.update(|c| c.set_progress(p)))
                .map(|config| {
                    console.update(|c| c.set_loaded_config(config));
                    "Configuration read.".to_string()
                });
            (result, true)
        }
        DeviceRequest::SaveConfig(config) => {
            console.update(|c| c.begin("Saving configuration..."));
            let result = session
                .save_config(&config, |p| console.update(|c| c.set_progress(p)))
                .map(|()| "Configuration saved.".to_string());
            (result, true)
        }
        DeviceRequest::SendRaw(text) => {
            console.update(|c| c.begin(format!("Sending {text}...")));
            (session.send_raw(&text).map(|_| format!("{port} Connected.")), true)
        }
        DeviceRequest::SendBeacon => {
            console.update(|c| c.begin("Sending beacon..."));
            let result = session
                .execute(&AtCommand::Send)
                .map(|_| "Beacon sent.".to_string());
            (result, true)
        }
        DeviceRequest::SendTest(count) => {
            console.update(|c| c.begin("Sending test packets..."));
            let result = session
                .execute(&AtCommand::Test(count))
                .map(|reply| match reply {
                    AtResponse::TestStarted(n) => format!("Sending {n} test packets."),
                    _ => "Test packets requested.".to_string(),
                });
            (result, true)
        }
        DeviceRequest::EnterKiss => {
            console.update(|c| c.begin("Entering KISS mode..."));
            let result = session
                .execute(&AtCommand::Kiss)
                .map(|_| "KISS mode active. Power cycle the device to use the console again.".to_string());
            (result, true)
        }
        DeviceRequest::Reboot { clear } => {
            let status = if clear { "Clearing settings..." } else { "Restarting device..." };
            console.update(|c| c.begin(status));
            let result = session
                .execute(&AtCommand::Reset { clear })
                .map(|_| "Device restarting. Reconnect when it is ready.".to_string());
            // The device drops off the bus while it restarts
            (result, false)
        }
        DeviceRequest::Disconnect => {
            log::info!("Disconnecting from {port}");
            (Ok("Disconnected.".to_string()), false)
        }
    };

    let traffic = session.take_traffic();
    let fatal = matches!(result, Err(ConfigToolError::Serial(_)));

    console.update(|c| {
        c.push_traffic(traffic);
        match &result {
            Ok(status) => {
                c.set_progress(100);
                c.finish(status.clone());
            }
            Err(e) => {
                log::warn!("Request on {port} failed: {e}");
                c.fail(e);
            }
        }
    });

    if fatal {
        log::error!("Lost serial link to {port}");
    }
    if fatal || !keep_open {
        // keep the request's outcome in the status bar
        console.update(|c| {
            let status = c.status.clone();
            c.set_disconnected();
            c.set_status(status);
        });
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionOptions;
    use crate::transport::SimulatedDevice;
    use std::time::{Duration, Instant};

    fn fast_session(device: &SimulatedDevice) -> DeviceSession {
        let options = SessionOptions {
            response_timeout: Duration::from_millis(200),
            command_delay: Duration::ZERO,
            idle_gap: Duration::from_millis(20),
        };
        DeviceSession::with_options(Box::new(device.clone()), options)
    }

    fn start(device: &SimulatedDevice) -> (mpsc::Sender<DeviceRequest>, Arc<Mutex<ConsoleBuffer>>) {
        let console = Arc::new(Mutex::new(ConsoleBuffer::new()));
        let tx = spawn_worker(fast_session(device), Arc::clone(&console));
        (tx, console)
    }

    fn wait_for(console: &Arc<Mutex<ConsoleBuffer>>, done: impl Fn(&ConsoleBuffer) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if done(&console.lock().unwrap()) {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("worker did not finish in time");
    }

    #[test]
    fn read_request_publishes_config() {
        let device = SimulatedDevice::default();
        let (tx, console) = start(&device);
        assert_eq!(console.lock().unwrap().status, "SIM Connected.");

        tx.send(DeviceRequest::ReadConfig).unwrap();
        wait_for(&console, |c| c.status == "Configuration read.");

        let mut buf = console.lock().unwrap();
        assert!((buf.progress - 1.0).abs() < f32::EPSILON);
        let config = buf.take_loaded_config().unwrap();
        assert_eq!(config.my_call().to_string(), "BG5HHP-1");
        assert!(buf.lines.iter().any(|l| l.kind == LineKind::Sent && l.text == "AT+MYCALL"));
    }

    #[test]
    fn failed_request_reports_error() {
        let device = SimulatedDevice::default();
        device.set_silent(true);
        let (tx, console) = start(&device);

        tx.send(DeviceRequest::SendBeacon).unwrap();
        wait_for(&console, |c| !c.busy && c.status.starts_with("No response"));
        assert_eq!(console.lock().unwrap().lines.back().unwrap().kind, LineKind::Error);
    }

    #[test]
    fn reboot_closes_the_link() {
        let device = SimulatedDevice::default();
        let (tx, console) = start(&device);

        tx.send(DeviceRequest::Reboot { clear: false }).unwrap();
        wait_for(&console, |c| c.connected_port().is_none());
        assert_eq!(device.restarts(), 1);
    }

    #[test]
    fn disconnect_stops_the_worker() {
        let device = SimulatedDevice::default();
        let (tx, console) = start(&device);
        tx.send(DeviceRequest::Disconnect).unwrap();
        wait_for(&console, |c| c.status == "Disconnected.");
    }

    #[test]
    fn unsolicited_output_reaches_the_console() {
        let device = SimulatedDevice::default();
        let (_tx, console) = start(&device);
        device.emit("TinyAPRS TNC (KISS) 1.1\r\n");
        wait_for(&console, |c| c.lines.iter().any(|l| l.text.starts_with("TinyAPRS")));
    }

    #[test]
    fn replaced_worker_leaves_the_new_link_alone() {
        let stale = SimulatedDevice::default();
        stale.set_silent(true);
        let (old_tx, console) = start(&stale);

        // the old worker is still waiting on its read when the new link opens
        old_tx.send(DeviceRequest::ReadConfig).unwrap();
        old_tx.send(DeviceRequest::Disconnect).unwrap();
        thread::sleep(Duration::from_millis(20));

        let fresh = SimulatedDevice::default();
        let new_tx = spawn_worker(fast_session(&fresh), Arc::clone(&console));

        // long enough for the old read to time out and the old worker to exit
        thread::sleep(Duration::from_millis(600));
        {
            let buf = console.lock().unwrap();
            assert_eq!(buf.connected_port(), Some("SIM"));
            assert_eq!(buf.status, "SIM Connected.");
            assert!(!buf.lines.iter().any(|l| l.kind == LineKind::Error));
        }

        new_tx.send(DeviceRequest::ReadConfig).unwrap();
        wait_for(&console, |c| c.status == "Configuration read.");
        assert_eq!(fresh.received().len(), 10);
    }
}
