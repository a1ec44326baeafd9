//! HTTP error mapping
//!
//! Clients get a short, generic message. Internal causes go to the log.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Report not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<netcrowd_core::Error> for ApiError {
    fn from(err: netcrowd_core::Error) -> Self {
        use netcrowd_core::Error;
        match err {
            Error::NotFound(id) => ApiError::NotFound(id),
            Error::InvalidStatus(_) | Error::InvalidSeverity(_) | Error::MalformedImport(_) => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(id) => {
                tracing::debug!(id = %id, "Report not found");
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Internal(cause) => {
                tracing::error!(cause = %cause, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, please try again".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let not_found = ApiError::from(netcrowd_core::Error::NotFound("RPT-404".into()));
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let bad = ApiError::from(netcrowd_core::Error::InvalidStatus("closed".into()));
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let io = std::io::Error::other("disk on fire");
        let internal = ApiError::from(netcrowd_core::Error::Io(io));
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
