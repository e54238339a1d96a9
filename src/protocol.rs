use crate::aprs::{CallSsid, Phg, Position, Ssid, Symbol};
use crate::device_config::RunModes;
use crate::parser::ReplyKind;

/// Line terminator expected by the device console
pub const LINE_ENDING: &str = "\r\n";

pub const DEFAULT_TEST_PACKETS: u8 = 3;
pub const MAX_TEST_PACKETS: u8 = 9;

// Console command set - matches the TinyAPRS firmware console.
// `None` payloads are queries: the device prints the current value.
#[derive(Debug, Clone, PartialEq)]
pub enum AtCommand {
    Info,
    MyCall(Option<CallSsid>),
    MySsid(Option<Ssid>),
    Dest(Option<CallSsid>),
    Path(Option<Vec<CallSsid>>),
    Location(Option<Position>),
    Symbol(Option<Symbol>),
    Comments(Option<String>),
    Mode(Option<RunModes>),
    SmartBeacon(Option<bool>),
    FixedLocation(Option<bool>),
    Phg(Option<Phg>),
    Send,
    Test(u8),
    Kiss,
    Reset { clear: bool },
    Raw(String),
}

impl AtCommand {
    pub fn to_ascii(&self) -> String {
        match self {
            AtCommand::Info => "?".to_string(),
            AtCommand::MyCall(call) => at("MYCALL", call.as_ref().map(ToString::to_string)),
            AtCommand::MySsid(ssid) => at("MYSSID", ssid.map(|s| s.to_string())),
            AtCommand::Dest(call) => at("DEST", call.as_ref().map(ToString::to_string)),
            AtCommand::Path(path) => at(
                "PATH",
                path.as_ref()
                    .filter(|hops| !hops.is_empty())
                    .map(|hops| join_path(hops)),
            ),
            AtCommand::Location(pos) => at("LOCA", pos.map(|p| p.to_aprs())),
            AtCommand::Symbol(symbol) => at("SYMBL", symbol.map(|s| s.to_wire())),
            AtCommand::Comments(text) => at("CMNTS", text.clone()),
            AtCommand::Mode(modes) => at("MODE", modes.map(|m| m.bits().to_string())),
            AtCommand::SmartBeacon(on) => at("SMART", on.map(flag)),
            AtCommand::FixedLocation(on) => at("FIXLOC", on.map(flag)),
            AtCommand::Phg(phg) => at("PHG", phg.map(|p| p.to_wire())),
            AtCommand::Send => "AT+SEND".to_string(),
            AtCommand::Test(count) => {
                // the firmware falls back to 3 packets for 0 or more than 9
                let count = if (1..=MAX_TEST_PACKETS).contains(count) {
                    *count
                } else {
                    DEFAULT_TEST_PACKETS
                };
                format!("!{count}")
            }
            AtCommand::Kiss => "AT+KISS=1".to_string(),
            AtCommand::Reset { clear } => format!("AT+RESET={}", if *clear { 2 } else { 1 }),
            AtCommand::Raw(text) => text.trim_end_matches(['\r', '\n']).to_string(),
        }
    }

    pub fn to_wire(&self) -> String {
        format!("{}{LINE_ENDING}", self.to_ascii())
    }

    /// The reply that completes this command, if the device sends one
    pub fn reply_kind(&self) -> Option<ReplyKind> {
        match self {
            AtCommand::MyCall(_) => Some(ReplyKind::MyCall),
            AtCommand::MySsid(_) => Some(ReplyKind::MySsid),
            AtCommand::Dest(_) => Some(ReplyKind::Dest),
            AtCommand::Path(_) => Some(ReplyKind::Path),
            AtCommand::Location(_) => Some(ReplyKind::Location),
            AtCommand::Symbol(_) => Some(ReplyKind::Symbol),
            AtCommand::Comments(_) => Some(ReplyKind::Comments),
            AtCommand::Mode(_) => Some(ReplyKind::Mode),
            AtCommand::SmartBeacon(_) => Some(ReplyKind::SmartBeacon),
            AtCommand::FixedLocation(_) => Some(ReplyKind::FixedLocation),
            AtCommand::Phg(_) => Some(ReplyKind::Phg),
            AtCommand::Send => Some(ReplyKind::SendOk),
            AtCommand::Test(_) => Some(ReplyKind::TestStarted),
            AtCommand::Reset { .. } => Some(ReplyKind::Restarting),
            AtCommand::Info | AtCommand::Kiss | AtCommand::Raw(_) => None,
        }
    }
}

fn at(key: &str, value: Option<String>) -> String {
    match value {
        Some(value) => format!("AT+{key}={value}"),
        None => format!("AT+{key}"),
    }
}

fn flag(on: bool) -> String {
    if on { "1" } else { "0" }.to_string()
}

pub fn join_path(hops: &[CallSsid]) -> String {
    hops.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_have_no_value() {
        assert_eq!(AtCommand::MyCall(None).to_ascii(), "AT+MYCALL");
        assert_eq!(AtCommand::Location(None).to_ascii(), "AT+LOCA");
        assert_eq!(AtCommand::Phg(None).to_ascii(), "AT+PHG");
    }

    #[test]
    fn setters_encode_their_values() {
        let call: CallSsid = "BG5HHP-1".parse().unwrap();
        assert_eq!(AtCommand::MyCall(Some(call)).to_wire(), "AT+MYCALL=BG5HHP-1\r\n");

        let pos = Position::from_decimal("30.123456N", "120.123456E").unwrap();
        assert_eq!(AtCommand::Location(Some(pos)).to_ascii(), "AT+LOCA=3007.41N/12007.41E");

        let modes = RunModes {
            kiss: true,
            digi: true,
            tracker: false,
        };
        assert_eq!(AtCommand::Mode(Some(modes)).to_ascii(), "AT+MODE=3");
        assert_eq!(AtCommand::SmartBeacon(Some(true)).to_ascii(), "AT+SMART=1");
        assert_eq!(AtCommand::FixedLocation(Some(false)).to_ascii(), "AT+FIXLOC=0");
        assert_eq!(
            AtCommand::Symbol(Some(Symbol::from_icon("r").unwrap())).to_ascii(),
            "AT+SYMBL=/r"
        );
        assert_eq!(
            AtCommand::Comments(Some("Hello".into())).to_ascii(),
            "AT+CMNTS=Hello"
        );
    }

    #[test]
    fn path_joins_hops() {
        let hops = vec!["WIDE1-1".parse().unwrap(), "WIDE2-2".parse().unwrap()];
        assert_eq!(AtCommand::Path(Some(hops)).to_ascii(), "AT+PATH=WIDE1-1,WIDE2-2");
        assert_eq!(AtCommand::Path(Some(vec![])).to_ascii(), "AT+PATH");
    }

    #[test]
    fn device_actions() {
        assert_eq!(AtCommand::Info.to_ascii(), "?");
        assert_eq!(AtCommand::Send.to_ascii(), "AT+SEND");
        assert_eq!(AtCommand::Test(5).to_ascii(), "!5");
        assert_eq!(AtCommand::Test(0).to_ascii(), "!3");
        assert_eq!(AtCommand::Test(12).to_ascii(), "!3");
        assert_eq!(AtCommand::Kiss.to_ascii(), "AT+KISS=1");
        assert_eq!(AtCommand::Reset { clear: false }.to_ascii(), "AT+RESET=1");
        assert_eq!(AtCommand::Reset { clear: true }.to_ascii(), "AT+RESET=2");
    }

    #[test]
    fn raw_text_is_sent_once_terminated() {
        assert_eq!(AtCommand::Raw("AT+HELP\r\n".into()).to_wire(), "AT+HELP\r\n");
        assert_eq!(AtCommand::Raw("AT+HELP".into()).reply_kind(), None);
    }
}
