use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SirError` and maps to other errors to
/// convert to a `SirError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SirError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// A model configuration violates one of its constraints. Raised before
    /// any simulation arrays are allocated.
    InvalidConfig(String),
    ReportError(String),
    SirError(String),
}

impl From<io::Error> for SirError {
    fn from(error: io::Error) -> Self {
        SirError::IoError(error)
    }
}

impl From<serde_json::Error> for SirError {
    fn from(error: serde_json::Error) -> Self {
        SirError::JsonError(error)
    }
}

impl From<csv::Error> for SirError {
    fn from(error: csv::Error) -> Self {
        SirError::CSVError(error)
    }
}

impl std::error::Error for SirError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SirError::IoError(error) => Some(error),
            SirError::JsonError(error) => Some(error),
            SirError::CSVError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for SirError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SirError::InvalidConfig(message) => write!(f, "invalid configuration: {message}"),
            SirError::ReportError(message) => write!(f, "report error: {message}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_display() {
        let error = SirError::InvalidConfig("steps must be positive".to_string());
        assert_eq!(
            error.to_string(),
            "invalid configuration: steps must be positive"
        );
    }

    #[test]
    fn io_error_converts_and_keeps_source() {
        let error: SirError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(error, SirError::IoError(_)));
        assert!(std::error::Error::source(&error).is_some());
    }
}
