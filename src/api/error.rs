//! Mapping from `LookupError` to HTTP responses.

use crate::utils::error::{ErrorCategory, LookupError};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_fields: Option<Vec<String>>,
}

/// Wrapper so handlers can use `?` on `LookupError`.
#[derive(Debug)]
pub struct ApiError(pub LookupError);

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LookupError::NotFound { .. } => StatusCode::NOT_FOUND,
            LookupError::InvalidField { .. } | LookupError::InvalidRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            err => match err.category() {
                ErrorCategory::DataSource => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self.0);
        }

        let body = match self.0 {
            LookupError::InvalidField { fields } => ErrorBody {
                detail: format!("Invalid field(s) requested: {}", fields.join(", ")),
                invalid_fields: Some(fields),
            },
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => ErrorBody {
                detail: "Internal server error".to_string(),
                invalid_fields: None,
            },
            err => ErrorBody {
                detail: err.to_string(),
                invalid_fields: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Router fallback, so unknown paths get the same JSON error body.
pub async fn route_not_found(uri: Uri) -> Response {
    tracing::debug!("No route for {}", uri.path());
    let body = ErrorBody {
        detail: format!("No route for {}", uri.path()),
        invalid_fields: None,
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
