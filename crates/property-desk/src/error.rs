use crate::access::AccessError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::leads::{LeadError, NotificationError};
use crate::media::UploadError;
use crate::storage::RepositoryError;
use crate::telemetry::TelemetryError;
use crate::validation::ValidationError;
use crate::visits::VisitError;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, error};

/// Startup and runtime failures of the service process.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
    #[error("notifier error: {0}")]
    Notifier(#[from] NotificationError),
}

/// Caller-facing error taxonomy. Server errors are logged in full and answered generically.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("not authorized")]
    Unauthorized,
    #[error("server error: {0}")]
    Server(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(err) => {
                let body = Json(json!({
                    "message": err.to_string(),
                    "errors": err.violations,
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::NotFound(what) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": what }))).into_response()
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Not authorized" })),
            )
                .into_response(),
            ApiError::Server(detail) => {
                error!(%detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        Self::Server(value.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::Validation(err) => Self::Validation(err),
            CatalogError::NotFound => Self::NotFound("Property not found"),
            CatalogError::Repository(err) => err.into(),
        }
    }
}

impl From<LeadError> for ApiError {
    fn from(value: LeadError) -> Self {
        match value {
            LeadError::Validation(err) => Self::Validation(err),
            LeadError::Repository(err) => err.into(),
        }
    }
}

impl From<VisitError> for ApiError {
    fn from(value: VisitError) -> Self {
        match value {
            VisitError::Repository(err) => err.into(),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(value: AccessError) -> Self {
        debug!(reason = %value, "admin credential check failed");
        Self::Unauthorized
    }
}

impl From<UploadError> for ApiError {
    fn from(value: UploadError) -> Self {
        match value {
            UploadError::Storage(err) => Self::Server(err.to_string()),
            caller @ (UploadError::MissingFile
            | UploadError::Empty
            | UploadError::UnsupportedType(_)) => {
                Self::Validation(ValidationError::single(caller.to_string()))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Validation(ValidationError::single(value.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(value: MultipartError) -> Self {
        Self::Validation(ValidationError::single(value.body_text()))
    }
}
