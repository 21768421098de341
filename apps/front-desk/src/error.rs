//! # API Error Type
//!
//! Unified error and success envelopes for the HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Front Desk                         │
//! │                                                                         │
//! │  Browser                     Rust Backend                               │
//! │  ───────                     ────────────                               │
//! │                                                                         │
//! │  POST /api/reservations/{id}/check-out                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler                                                         │  │
//! │  │  Result<Json<ApiResponse<T>>, ApiError>                          │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  DbError::NotFound ──────────────────► 404 NOT_FOUND            │  │
//! │  │  DbError::Rule(Validation) ──────────► 400 VALIDATION_ERROR     │  │
//! │  │  DbError::Rule(rule) ────────────────► 409 PRECONDITION_FAILED  │  │
//! │  │  DbError::ConstraintViolation ───────► 409 PRECONDITION_FAILED  │  │
//! │  │  storage failure (logged) ───────────► 500 DATABASE_ERROR       │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ───────────────────────────► 200 { status: "ok" }      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄────────────────────────────────────────────────────────────────────  │
//! │                                                                         │
//! │  { "status": "error",                                                   │
//! │    "code": "PRECONDITION_FAILED",                                       │
//! │    "message": "Reservation ... has no paid invoice" }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use innkeep_core::{CoreError, ErrorKind};
use innkeep_db::error::guard;
use innkeep_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "status": "error",
///   "code": "NOT_FOUND",
///   "message": "Room not found: 6f1c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Always `"error"`.
    pub status: &'static str,

    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// A business rule blocks the operation (409)
    PreconditionFailed,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::PreconditionFailed => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::Validation => ErrorCode::ValidationError,
            ErrorKind::PreconditionFailed => ErrorCode::PreconditionFailed,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status: "error",
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Rule(rule) => rule.into(),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::PreconditionFailed,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConstraintViolation { guard } => {
                warn!(guard = %guard, "Storage guard rejected write");
                ApiError::new(ErrorCode::PreconditionFailed, guard_message(&guard))
            }
            DbError::ForeignKeyViolation { message } => {
                warn!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::PreconditionFailed, "Invalid or still-referenced record")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::new(err.kind().into(), err.to_string())
    }
}

/// Human text for a storage guard. Another request won the race for the
/// same room or reservation.
fn guard_message(token: &str) -> String {
    match token {
        guard::ROOM_DATE_CONFLICT => {
            "Room was booked for overlapping dates by a concurrent request".to_string()
        }
        guard::ROOM_LIMIT_REACHED => {
            "Reservation reached its room limit in a concurrent request".to_string()
        }
        guard::ROOM_COUNT_BELOW_ASSIGNED => {
            "Required rooms cannot be lower than the rooms already assigned".to_string()
        }
        guard::INVOICE_DELETE_PROTECTED => "Paid invoices cannot be deleted".to_string(),
        _ => "Operation violates a storage constraint".to_string(),
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Success envelope.
///
/// ```json
/// { "status": "ok", "message": "Room assigned", "data": { ... } }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always `"ok"`.
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(ApiResponse {
            status: "ok",
            message: message.into(),
            data,
        })
    }
}

/// Handler result type.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use innkeep_core::ValidationError;

    #[test]
    fn test_rule_errors_map_to_conflict() {
        let err: ApiError = DbError::Rule(CoreError::NotConfirmed("r-1".to_string())).into();
        assert_eq!(err.code, ErrorCode::PreconditionFailed);
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
        assert_eq!(err.status, "error");
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: ApiError = DbError::from(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found() {
        let err: ApiError = DbError::not_found("Room", "abc").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Room not found: abc");
    }

    #[test]
    fn test_guard_hides_token() {
        let err: ApiError = DbError::ConstraintViolation {
            guard: guard::ROOM_DATE_CONFLICT.to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PreconditionFailed);
        assert!(!err.message.contains(guard::ROOM_DATE_CONFLICT));
    }

    #[test]
    fn test_storage_failure_is_generic() {
        let err: ApiError = DbError::QueryFailed("disk I/O error at page 7".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::validation("bad")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "bad");
    }
}
