//! # Error Types
//!
//! Domain-specific error types for innkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  innkeep-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule rejections                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  innkeep-db errors (separate crate)                                    │
//! │  └── DbError          - Storage failures, wraps CoreError              │
//! │                                                                         │
//! │  front-desk errors (app)                                               │
//! │  └── ApiError         - What the browser sees (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Browser      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every message names the concrete limit, conflicting reservation, or stock
//! level involved so the front desk can act on it.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::{InvoiceStatus, StayState};

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification used by the API layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced entity id does not exist.
    NotFound,
    /// Malformed or missing input.
    Validation,
    /// A business rule blocks the operation.
    PreconditionFailed,
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// All of these are detected before any write happens.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The reservation already holds as many rooms as it asked for.
    ///
    /// ## User Workflow
    /// ```text
    /// Reservation needs 2 rooms, has 101 and 102
    ///      │
    ///      ▼
    /// Assign room 103
    ///      │
    ///      ▼
    /// RoomLimitReached { limit: 2, current: 2 }
    ///      │
    ///      ▼
    /// UI shows: "Reservation ... already has 2 of 2 rooms"
    /// ```
    #[error("Reservation {reservation_id} already has {current} of {limit} rooms assigned")]
    RoomLimitReached {
        reservation_id: String,
        limit: i64,
        current: i64,
    },

    /// The room is already held by another reservation for overlapping dates.
    #[error(
        "Room {room} is already assigned to reservation {conflicting_id} from {} to {}",
        .check_in.format("%d/%m/%y"),
        .check_out.format("%d/%m/%y")
    )]
    DateConflict {
        room: String,
        conflicting_id: String,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    },

    /// Reducing the required room count below what is already assigned.
    #[error("Reservation {reservation_id} has {assigned} rooms assigned, cannot require only {requested}")]
    RoomCountBelowAssigned {
        reservation_id: String,
        assigned: i64,
        requested: i64,
    },

    /// The guest is already inside the hotel.
    #[error("Reservation {0} is already checked in")]
    AlreadyCheckedIn(String),

    /// The reservation has not been confirmed by staff.
    #[error("Reservation {0} must be confirmed before check-in")]
    NotConfirmed(String),

    /// Check-in without any physical room.
    #[error("Reservation {0} has no rooms assigned")]
    NoRoomsAssigned(String),

    /// The stay is already closed.
    #[error("Reservation {0} is already checked out")]
    AlreadyCheckedOut(String),

    /// Check-out requested before check-in.
    #[error("Reservation {0} has not checked in yet")]
    NotCheckedIn(String),

    /// The stay cannot be changed in its current state.
    #[error("Reservation {reservation_id} is {state}, cannot perform operation")]
    InvalidStayState {
        reservation_id: String,
        state: StayState,
    },

    /// Check-out requires an invoice.
    #[error("Reservation {0} has no invoice; generate and settle it before check-out")]
    InvoiceMissing(String),

    /// Check-out requires a paid invoice.
    #[error("Invoice {invoice_id} is {status}; it must be paid before check-out")]
    InvoiceUnpaid {
        invoice_id: String,
        status: InvoiceStatus,
    },

    /// One invoice per reservation, ever.
    #[error("Reservation {reservation_id} already has invoice {invoice_id}")]
    InvoiceAlreadyExists {
        reservation_id: String,
        invoice_id: String,
    },

    /// Invoices are billed to the primary guest.
    #[error("Reservation {0} has no primary guest to bill")]
    NoPrimaryGuest(String),

    /// Payment was already recorded.
    #[error("Invoice {0} is already paid")]
    InvoiceAlreadyPaid(String),

    /// Invoice cannot be voided in its current state.
    #[error("Invoice {invoice_id} is {status}, cannot be voided")]
    InvoiceNotVoidable {
        invoice_id: String,
        status: InvoiceStatus,
    },

    /// Product is withdrawn from sale.
    #[error("Product {0} is not active")]
    ProductInactive(String),

    /// Not enough units left in stock.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// An amount no longer fits in the integer money range.
    #[error("{0} exceeds the largest representable amount")]
    AmountOverflow(&'static str),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Classifies the error for the API layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Validation(_) | CoreError::AmountOverflow(_) => ErrorKind::Validation,
            _ => ErrorKind::PreconditionFailed,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Check-out is not after check-in.
    #[error("check_out must be after check_in")]
    EmptyStay,

    /// Check-in date is in the past.
    #[error("check_in date {check_in} is before today ({today})")]
    CheckInInPast {
        check_in: chrono::NaiveDate,
        today: chrono::NaiveDate,
    },

    /// Duplicate value (e.g., identification already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Agua 600ml".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Agua 600ml: available 2, requested 3"
        );

        let err = CoreError::RoomLimitReached {
            reservation_id: "r-1".to_string(),
            limit: 1,
            current: 1,
        };
        assert_eq!(
            err.to_string(),
            "Reservation r-1 already has 1 of 1 rooms assigned"
        );
    }

    #[test]
    fn test_date_conflict_names_reservation_and_dates() {
        let err = CoreError::DateConflict {
            room: "204".to_string(),
            conflicting_id: "r-9".to_string(),
            check_in: Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap(),
            check_out: Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Room 204 is already assigned to reservation r-9 from 01/03/24 to 04/03/24"
        );
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(CoreError::not_found("Room", "x").kind(), ErrorKind::NotFound);
        assert_eq!(
            CoreError::NotConfirmed("r".into()).kind(),
            ErrorKind::PreconditionFailed
        );
        let validation: CoreError = ValidationError::EmptyStay.into();
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert_eq!(
            CoreError::AmountOverflow("lodging subtotal").kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "first_name".to_string(),
        };
        assert_eq!(err.to_string(), "first_name is required");
    }
}
