//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          Rule rejection (CoreError)        │
//! │       │                                    │                            │
//! │       ▼                                    ▼                            │
//! │  DbError (this module) ◄───────────── DbError::Rule                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (front-desk app) ← Serialized for the browser                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Trigger guards in the schema abort with a fixed token
//! (`ROOM_DATE_CONFLICT`, ...). Those become [`DbError::ConstraintViolation`]
//! so callers can tell a lost race from a broken query.

use innkeep_core::{CoreError, ErrorKind};
use thiserror::Error;

/// Trigger guard tokens raised by the schema.
pub mod guard {
    pub const ROOM_DATE_CONFLICT: &str = "ROOM_DATE_CONFLICT";
    pub const ROOM_LIMIT_REACHED: &str = "ROOM_LIMIT_REACHED";
    pub const ROOM_COUNT_BELOW_ASSIGNED: &str = "ROOM_COUNT_BELOW_ASSIGNED";
    pub const INVOICE_DELETE_PROTECTED: &str = "INVOICE_DELETE_PROTECTED";

    pub(crate) const ALL: [&str; 4] = [
        ROOM_DATE_CONFLICT,
        ROOM_LIMIT_REACHED,
        ROOM_COUNT_BELOW_ASSIGNED,
        INVOICE_DELETE_PROTECTED,
    ];
}

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - A "touch" update at the start of a transaction matched no row
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Second invoice for a reservation
    /// - Duplicate guest document, room number, product name
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint or trigger guard rejected the write.
    ///
    /// ## When This Occurs
    /// - A concurrent request linked the room first (`ROOM_DATE_CONFLICT`)
    /// - Paid invoice deletion (`INVOICE_DELETE_PROTECTED`)
    /// - Stock would go negative (`CHECK constraint failed`)
    #[error("Constraint violation: {guard}")]
    ConstraintViolation { guard: String },

    /// A business rule rejected the operation inside a transaction.
    #[error(transparent)]
    Rule(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true if this is the given trigger guard.
    pub fn is_guard(&self, token: &str) -> bool {
        matches!(self, DbError::ConstraintViolation { guard } if guard == token)
    }

    /// Coarse classification for the HTTP layer, `None` for storage faults.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            DbError::NotFound { .. } => Some(ErrorKind::NotFound),
            DbError::Rule(rule) => Some(rule.kind()),
            DbError::UniqueViolation { .. } | DbError::ConstraintViolation { .. } => {
                Some(ErrorKind::PreconditionFailed)
            }
            _ => None,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
///                               (UNIQUE, FOREIGN KEY, CHECK, trigger guard)
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if let Some(token) = guard::ALL.iter().find(|token| msg.contains(**token)) {
                    DbError::ConstraintViolation {
                        guard: token.to_string(),
                    }
                } else if msg.contains("UNIQUE constraint failed") {
                    // "UNIQUE constraint failed: <table>.<column>[, ...]"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::ConstraintViolation {
                        guard: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<innkeep_core::ValidationError> for DbError {
    fn from(err: innkeep_core::ValidationError) -> Self {
        DbError::Rule(CoreError::Validation(err))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            DbError::not_found("Room", "x").kind(),
            Some(ErrorKind::NotFound)
        );
        assert_eq!(
            DbError::Rule(CoreError::NotConfirmed("r".into())).kind(),
            Some(ErrorKind::PreconditionFailed)
        );
        assert_eq!(
            DbError::ConstraintViolation {
                guard: guard::ROOM_DATE_CONFLICT.into()
            }
            .kind(),
            Some(ErrorKind::PreconditionFailed)
        );
        assert_eq!(DbError::PoolExhausted.kind(), None);
    }

    #[test]
    fn test_is_guard() {
        let err = DbError::ConstraintViolation {
            guard: guard::INVOICE_DELETE_PROTECTED.into(),
        };
        assert!(err.is_guard(guard::INVOICE_DELETE_PROTECTED));
        assert!(!err.is_guard(guard::ROOM_LIMIT_REACHED));
    }

    #[test]
    fn test_rule_message_is_transparent() {
        let err: DbError = CoreError::InvoiceAlreadyPaid("f-1".into()).into();
        assert_eq!(err.to_string(), "Invoice f-1 is already paid");
    }
}
