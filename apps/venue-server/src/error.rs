//! Error types for the HTTP API.
//!
//! Every failure leaves the server as `{"code": "...", "message": "..."}`
//! with a status chosen from the error's [`ErrorKind`]. Storage failures
//! are logged here and reach the client only as a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use venue_core::{CoreError, ErrorKind};
use venue_db::DbError;

pub type ApiResult<T> = Result<T, ApiError>;

/// API errors.
#[derive(Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a serde_json::Value>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Missing, malformed or expired bearer token.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Storage.as_str(),
            message,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

/// HTTP status for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidState | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::InsufficientStock => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let kind = err.kind();
        let details = match &err {
            CoreError::InsufficientStock {
                item_id,
                available,
                requested,
            } => Some(serde_json::json!({
                "item_id": item_id,
                "available": available,
                "requested": requested,
            })),
            _ => None,
        };

        ApiError {
            status: status_for(kind),
            code: kind.as_str(),
            message: err.to_string(),
            details,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            storage => {
                error!(error = %storage, "Storage failure");
                ApiError::internal("internal storage error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: &self.message,
            details: self.details.as_ref(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_to_status() {
        let err: ApiError = CoreError::not_found("Order", "o-1").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");

        let err: ApiError = CoreError::invalid_state("completed").into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError = CoreError::InsufficientStock {
            item_id: "i-1".into(),
            available: 5,
            requested: 6,
        }
        .into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.details.as_ref().unwrap()["available"], 5);

        let err: ApiError = CoreError::permission_denied("no").into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_storage_errors_are_opaque() {
        let err: ApiError = DbError::QueryFailed("near \"SELEC\": syntax error".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "STORAGE");
        assert_eq!(err.message, "internal storage error");
    }
}
