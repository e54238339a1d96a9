// Serial port configuration
pub const DEFAULT_BAUD_RATE: u32 = 9_600;
pub const BAUD_RATES: [u32; 5] = [4_800, 9_600, 19_200, 38_400, 115_200];
pub const SERIAL_READ_TIMEOUT_MS: u64 = 5_000;
pub const SERIAL_WRITE_TIMEOUT_MS: u64 = 5_000;
pub const SERIAL_POLL_INTERVAL_MS: u64 = 100;
pub const INTER_COMMAND_DELAY_MS: u64 = 100;
pub const RAW_IDLE_GAP_MS: u64 = 300;

// Device console limits
pub const CONSOLE_LINE_MAX: usize = 64;
pub const MAX_COMMENT_LEN: usize = CONSOLE_LINE_MAX - "AT+CMNTS=".len();
pub const MAX_PATH_ENTRIES: usize = 2;

// Console buffer limits
pub const MAX_CONSOLE_LINES: usize = 500;

// Form defaults
pub const DEFAULT_CALLSIGN: &str = "BG5HHP";
pub const DEFAULT_SSID: u8 = 1;
pub const DEFAULT_LATITUDE: &str = "30.123456N";
pub const DEFAULT_LONGITUDE: &str = "120.123456E";
pub const DEFAULT_BEACON_TEXT: &str = "APTI01 Beacon 431.040 Happy New Year!";
pub const DEFAULT_CONSOLE_COMMAND: &str = "AT+HELP";
pub const DEFAULT_ICON: char = 'r';
pub const DEFAULT_DESTINATION: &str = "APTB01";
pub const DEFAULT_PATH: [&str; 2] = ["WIDE1-1", "WIDE2-2"];

pub const APP_TITLE: &str = "TinyAPRS Configuration";
pub const SETTINGS_DIR_NAME: &str = "tinyaprs_config";
