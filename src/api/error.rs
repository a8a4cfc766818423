//! HTTP error mapping.
//!
//! Every handler error becomes `{"detail": "<context>: <message>", "code": "<code>"}`
//! with a status chosen from the [`SolarisError`] variant.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::error::SolarisError;

/// Error returned from API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    detail: String,
}

impl ApiError {
    /// Wrap a core error, prefixing its message with `context`.
    pub fn new(context: &str, err: SolarisError) -> Self {
        Self {
            status: status_for(&err),
            code: err.code(),
            detail: format!("{context}: {err}"),
        }
    }

    /// Body validation failure. The router is never reached.
    pub fn invalid(err: SolarisError) -> Self {
        Self::new("Invalid request", err)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            other => other.status(),
        };
        let code = if status == StatusCode::UNPROCESSABLE_ENTITY {
            "validation_error"
        } else {
            "invalid_request"
        };
        Self {
            status,
            code,
            detail: format!("Invalid request: {}", rejection.body_text()),
        }
    }
}

fn status_for(err: &SolarisError) -> StatusCode {
    match err {
        SolarisError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SolarisError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SolarisError::ProviderCall { .. } => StatusCode::BAD_GATEWAY,
        SolarisError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        SolarisError::UnsupportedProvider(_)
        | SolarisError::Cache(_)
        | SolarisError::Config(_)
        | SolarisError::Io(_)
        | SolarisError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), code = self.code, "{}", self.detail);
        } else {
            warn!(status = self.status.as_u16(), code = self.code, "{}", self.detail);
        }
        let body = Json(json!({ "detail": self.detail, "code": self.code }));
        (self.status, body).into_response()
    }
}
