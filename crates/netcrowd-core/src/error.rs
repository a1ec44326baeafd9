//! Error types for netcrowd

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid severity: {0}")]
    InvalidSeverity(String),

    #[error("Malformed import document: {0}")]
    MalformedImport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error means the requested report does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound("RPT-999".into());
        assert_eq!(err.to_string(), "Report not found: RPT-999");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_not_found());
    }
}
