use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Errors surfaced to callers of the region directory.
///
/// Cloneable so a single failed load can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    /// A level fetch failed or returned records without a name.
    #[error("Region source unavailable: {0}")]
    SourceUnavailable(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

#[derive(Debug)]
pub enum AppError {
    /// Nothing is held yet; distinct from a missing resource.
    NotLoaded { message: String },
    Unavailable { message: String, details: Value },
}

impl AppError {
    pub fn not_loaded(message: impl Into<String>) -> Self {
        Self::NotLoaded {
            message: message.into(),
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::NotLoaded { message } => {
                (StatusCode::NOT_FOUND, "not_loaded", message, json!({}))
            }
            AppError::Unavailable { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "source_unavailable",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegionError> for AppError {
    fn from(e: RegionError) -> Self {
        match e {
            RegionError::SourceUnavailable(reason) => AppError::unavailable(
                "Region directory could not be loaded",
                json!({ "reason": reason }),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_maps_to_503() {
        let error: AppError = RegionError::SourceUnavailable("county: timeout".to_string()).into();
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_not_loaded_is_404() {
        let response = AppError::not_loaded("Region directory not loaded").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
