/// Conversion of service errors into JSON error responses.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use vidgrab_shared::errors::{ExtractionError, ServiceError, StorageError};

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Handler error: a `ServiceError` plus an optional short message for the caller.
#[derive(Debug)]
pub struct ApiError {
    source: ServiceError,
    summary: Option<&'static str>,
}

impl ApiError {
    /// Replace the default short `error` text of a server-side failure.
    pub fn with_summary(mut self, summary: &'static str) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn status(&self) -> StatusCode {
        if self.source.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn default_summary(err: &ServiceError) -> &'static str {
    match err {
        ServiceError::Validation(_) => "Invalid request",
        ServiceError::Storage(_) => "Failed to create download session",
        ServiceError::Extraction(_) => "Failed to download video",
        ServiceError::OutputMissing { .. } => "No file was downloaded",
    }
}

impl From<ServiceError> for ApiError {
    fn from(source: ServiceError) -> Self {
        Self { source, summary: None }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        ServiceError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if self.source.is_client_error() {
            warn!("Rejected request: {}", self.source);
            ErrorBody {
                error: self.source.to_string(),
                details: None,
            }
        } else {
            let summary = self.summary.unwrap_or_else(|| default_summary(&self.source));
            error!("{}: {}", summary, self.source);
            ErrorBody {
                error: summary.to_string(),
                details: Some(self.source.to_string()),
            }
        };
        (status, Json(body)).into_response()
    }
}
