use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lostfound_db::StoreError;
use thiserror::Error;
use tracing::error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Clients match on `code`, never on `message`.

pub mod error_code {
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const CONFLICT: &str = "CONFLICT";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── ApiError ────────────────────────────────────────────────────────

/// Every failure a handler can return.
///
/// Rendered as `{"code": "NOT_FOUND", "message": "message 4 not found"}`.
/// `Internal` never carries details; the cause is logged where it is
/// converted.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or empty input. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Message or thread does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid credential on an endpoint that needs one. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is neither the author nor an administrator. HTTP 403.
    #[error("{0}")]
    Forbidden(String),

    /// Request would break the two-level thread structure. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Storage failure or broken invariant. HTTP 500.
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => error_code::VALIDATION_FAILED,
            ApiError::NotFound(_) => error_code::NOT_FOUND,
            ApiError::Unauthorized(_) => error_code::UNAUTHENTICATED,
            ApiError::Forbidden(_) => error_code::PERMISSION_DENIED,
            ApiError::Conflict(_) => error_code::CONFLICT,
            ApiError::Internal => error_code::INTERNAL,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => ApiError::Validation(msg),
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Forbidden(msg) => ApiError::Forbidden(msg),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Invariant(msg) => {
                error!("Invariant broken: {}", msg);
                ApiError::Internal
            }
            StoreError::Sqlite(e) => {
                error!("Storage failure: {}", e);
                ApiError::Internal
            }
            StoreError::LockPoisoned => {
                error!("Database lock poisoned");
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(ApiError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_errors_keep_their_class() {
        assert!(matches!(
            ApiError::from(StoreError::Conflict("reply to reply".into())),
            ApiError::Conflict(m) if m == "reply to reply"
        ));
        assert!(matches!(
            ApiError::from(StoreError::Forbidden("no".into())),
            ApiError::Forbidden(_)
        ));
    }

    #[test]
    fn invariant_breaches_do_not_leak() {
        let err = ApiError::from(StoreError::Invariant("reply 3 hangs off reply 2".into()));
        assert_eq!(err.error_code(), "INTERNAL");
        assert_eq!(err.to_string(), "internal server error");
    }
}
