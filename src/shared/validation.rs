use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Clock time as entered in the report form
    /// - Valid: "06:30", "23:59", "00:00"
    /// - Invalid: "6:30", "24:00", "12:60", "12:30:00"
    pub static ref TIME_REGEX: Regex = Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap();

    /// Report number: 8-digit date followed by a sequence of at least 3 digits
    /// - Valid: "20240521003", "202405211000"
    /// - Invalid: "2024052103", "RPT-1", "../etc"
    pub static ref REPORT_NUMBER_REGEX: Regex = Regex::new(r"^[0-9]{8}[0-9]{3,}$").unwrap();

    /// Characters kept when sanitizing an uploaded file name
    pub static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]+").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_regex() {
        assert!(TIME_REGEX.is_match("06:30"));
        assert!(TIME_REGEX.is_match("23:59"));
        assert!(TIME_REGEX.is_match("00:00"));
        assert!(!TIME_REGEX.is_match("6:30"));
        assert!(!TIME_REGEX.is_match("24:00"));
        assert!(!TIME_REGEX.is_match("12:60"));
        assert!(!TIME_REGEX.is_match("12:30:00"));
    }

    #[test]
    fn test_report_number_regex() {
        assert!(REPORT_NUMBER_REGEX.is_match("20240521003"));
        assert!(REPORT_NUMBER_REGEX.is_match("202405211000"));
        assert!(!REPORT_NUMBER_REGEX.is_match("2024052103"));
        assert!(!REPORT_NUMBER_REGEX.is_match("RPT-1"));
        assert!(!REPORT_NUMBER_REGEX.is_match("../etc"));
    }
}
