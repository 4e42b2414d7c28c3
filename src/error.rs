use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Format error: missing required column(s): {}", missing.join(", "))]
    Format { missing: Vec<String> },

    #[error("Insufficient data: {available} aligned points available, at least {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Io(format!("CSV error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// Alias for convenience
pub type Error = AppError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_lists_missing_columns() {
        let err = AppError::Format {
            missing: vec!["<DTYYYYMMDD>".to_string(), "<CLOSE>".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Format error: missing required column(s): <DTYYYYMMDD>, <CLOSE>"
        );
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = AppError::InsufficientData { available: 3, required: 7 };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('7'));
    }
}
