use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by repcount.
#[derive(Error, Debug)]
pub enum RepError {
    /// No sheet in the document matches the requested month label.
    #[error("Sheet \"{sheet}\" not found (available: {})", available.join(", "))]
    NotFound {
        sheet: String,
        available: Vec<String>,
    },

    /// The sheet header is missing a required column or is otherwise malformed.
    #[error("Format error: {0}")]
    Format(String),

    /// A row failed coercion (malformed count or date).
    #[error("Data error in row {row}: {reason}")]
    Data { row: usize, reason: String },

    /// A query matched zero rows where at least one was required.
    #[error("No {exercise} sets recorded between {start} and {end}")]
    NoData {
        exercise: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// A projection on the last day of the month with the goal still unmet.
    #[error("Required daily rate for {exercise} is undefined: {shortfall} to go with no days remaining")]
    DivisionUndefined { exercise: String, shortfall: u64 },

    /// A date range or as-of date is inverted or lies outside the month.
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// A month label string could not be parsed.
    #[error("Invalid month label: {0}")]
    InvalidMonthLabel(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet library rejected the document.
    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    /// A chart backend failed to draw or write its output.
    #[error("Chart error: {0}")]
    Chart(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the repcount crates.
pub type Result<T> = std::result::Result<T, RepError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_error_display_not_found_lists_sheets() {
        let err = RepError::NotFound {
            sheet: "2024-March".to_string(),
            available: vec!["2024-January".to_string(), "2024-February".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Sheet \"2024-March\" not found (available: 2024-January, 2024-February)"
        );
    }

    #[test]
    fn test_error_display_format() {
        let err = RepError::Format("Required column missing: count".to_string());
        assert_eq!(err.to_string(), "Format error: Required column missing: count");
    }

    #[test]
    fn test_error_display_data() {
        let err = RepError::Data {
            row: 7,
            reason: "count \"ten\" is not a non-negative integer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data error in row 7: count \"ten\" is not a non-negative integer"
        );
    }

    #[test]
    fn test_error_display_no_data() {
        let err = RepError::NoData {
            exercise: "pullups".to_string(),
            start: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 11, 30).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "No pullups sets recorded between 2024-11-01 and 2024-11-30"
        );
    }

    #[test]
    fn test_error_display_division_undefined() {
        let err = RepError::DivisionUndefined {
            exercise: "pushups".to_string(),
            shortfall: 60,
        };
        let msg = err.to_string();
        assert!(msg.contains("undefined"));
        assert!(msg.contains("60 to go"));
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = RepError::FileRead {
            path: PathBuf::from("/some/log.xlsx"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/log.xlsx"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: RepError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: RepError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
