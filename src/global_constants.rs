#![allow(dead_code)]

pub const APPLICATION_CONFIG_DIR: &str = "freeselect";

pub const LOG_TAG_APP: &str = "[APP]";
pub const LOG_TAG_ACQUISITION: &str = "[ACQUISITION]";
pub const LOG_TAG_SESSION: &str = "[SESSION]";
pub const LOG_TAG_DECODER: &str = "[DECODER]";
pub const LOG_TAG_RAW_FRAME: &str = "[RAW_FRAME]";
pub const LOG_TAG_SELECTION: &str = "[SELECTION]";
pub const LOG_TAG_EXTRACTION: &str = "[EXTRACTION]";
pub const LOG_TAG_PREVIEW: &str = "[PREVIEW]";
pub const LOG_TAG_ORCHESTRATOR: &str = "[ORCHESTRATOR]";
pub const LOG_TAG_SETTINGS: &str = "[SETTINGS]";
pub const LOG_TAG_PLATFORM: &str = "[PLATFORM]";
pub const LOG_TAG_SAVER: &str = "[SAVER]";

pub const STATUS_READY: &str = "Ready - request a capture to start selecting";
pub const STATUS_CAPTURING: &str = "Capturing screen...";
pub const STATUS_SELECTING: &str = "Draw around the region you want to keep";
pub const STATUS_CAPTURE_FAILED: &str = "Screen capture failed";
pub const STATUS_PERMISSION_EXPIRED: &str =
    "Screen capture permission expired, please authorize again";
pub const STATUS_IMAGE_SAVED: &str = "Image saved";
pub const STATUS_SAVE_FAILED: &str = "Failed to save the selected region";
pub const STATUS_SELECTION_DISCARDED: &str = "Selection discarded";

pub const ERROR_CONTEXT_PRIMARY_MONITOR: &str = "Unable to find primary monitor";
pub const ERROR_CONTEXT_CAPTURE_MONITOR: &str = "Unable to capture Monitor";
pub const ERROR_CONTEXT_MONITOR_METRICS: &str = "Unable to read monitor metrics";

pub const BYTES_PER_PIXEL: usize = 4;
pub const MIN_BUFFER_DEPTH: usize = 2;

pub const DEFAULT_POST_CREATION_SETTLE_MS: u64 = 300;
pub const DEFAULT_PRE_READ_SETTLE_MS: u64 = 200;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1500;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 16;
pub const DEFAULT_MAX_AUTOMATIC_RETRIES: u32 = 1;
pub const DEFAULT_RETRY_COOLDOWN_MS: u64 = 500;

pub const DEFAULT_MIN_CLOSING_POINTS: usize = 10;
pub const MIN_EXTRACTABLE_POINTS: usize = 3;

pub const DEFAULT_DIM_RGBA: [u8; 4] = [0, 0, 0, 100];
pub const DEFAULT_FILL_RGBA: [u8; 4] = [255, 0, 0, 50];
pub const DEFAULT_STROKE_RGBA: [u8; 4] = [255, 0, 0, 255];
pub const DEFAULT_STROKE_WIDTH: f32 = 6.0;

pub const SESSION_COMMAND_QUEUE_DEPTH: usize = 8;

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SCREENSHOT_DIRECTORY_NAME: &str = "ScreenCapture";
pub const SCREENSHOT_FILE_PREFIX: &str = "Screenshot_";
pub const SCREENSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const STARTUP_BANNER: &str = r#"
╔════════════════════════════════════════════════════════╗
║  FreeSelect - Freehand Screen Capture                  ║
║                                                        ║
║  Usage: freeselect [selection.json]                    ║
║                                                        ║
║  Without a selection file a centred ellipse is used.   ║
║  Set RUST_LOG=debug for detailed capture logging.      ║
║                                                        ║
╚════════════════════════════════════════════════════════╝
"#;
