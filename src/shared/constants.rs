/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// File extensions accepted as report photos (lowercase, no dot)
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Attempts the report number allocator makes before giving up
pub const REPORT_NUMBER_MAX_ATTEMPTS: i64 = 10;

/// Width of the zero-padded daily sequence in a report number
pub const REPORT_NUMBER_SEQUENCE_WIDTH: usize = 3;

/// Timestamp format used in mail bodies and log lines
pub const DISPLAY_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
