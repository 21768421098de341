//! # Validation Module
//!
//! Input validation for front-desk requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser                                                       │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field and stay validation                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK / UNIQUE constraints                             │
//! │  └── Triggers guarding room overlap and room limits                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use innkeep_core::validation::{validate_quantity, validate_uuid};
//!
//! validate_quantity(3).unwrap();
//! assert!(validate_uuid("product_id", "not-a-uuid").is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::stay::StayPeriod;
use crate::types::{NewGuest, NewReservation};
use crate::MAX_CONSUMPTION_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field: non-blank, at most `max` characters.
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an optional free-text field: only the length is checked.
pub fn validate_optional(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.trim().chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates an email address.
///
/// Only the shape `local@domain.tld` is checked; deliverability is not.
///
/// ## Example
/// ```rust
/// use innkeep_core::validation::validate_email;
///
/// assert!(validate_email("ana@example.com").is_ok());
/// assert!(validate_email("ana.example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required("email", email, 254)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.trim().split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }
    if domain.starts_with('.') || domain.ends_with('.') || email.contains(char::is_whitespace) {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a phone number: digits with optional `+`, spaces, and hyphens.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    validate_required("phone", phone, 30)?;

    let phone = phone.trim();
    let allowed = phone
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '-' || (i == 0 && c == '+'));
    let digits = phone.chars().filter(char::is_ascii_digit).count();

    if !allowed || digits < 7 {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain at least 7 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates an identity document number (letters and digits only).
pub fn validate_document(field: &str, number: &str) -> ValidationResult<()> {
    validate_required(field, number, 30)?;

    if !number.trim().chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a consumption quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_CONSUMPTION_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_CONSUMPTION_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_CONSUMPTION_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in the smallest currency unit. Zero is allowed.
///
/// ## Example
/// ```rust
/// use innkeep_core::validation::validate_price;
///
/// assert!(validate_price("base_price", 120_000).is_ok());
/// assert!(validate_price("base_price", -1).is_err());
/// ```
pub fn validate_price(field: &str, amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an optional count (rooms, guests): non-negative when present.
pub fn validate_count(field: &str, count: Option<i64>) -> ValidationResult<()> {
    match count {
        Some(n) if n < 0 => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a booking request and returns its stay period.
///
/// `today` is the caller's current date.
pub fn validate_new_reservation(
    input: &NewReservation,
    today: NaiveDate,
) -> ValidationResult<StayPeriod> {
    validate_required("first_name", &input.first_name, 100)?;
    validate_required("last_name", &input.last_name, 100)?;
    validate_document("identification", &input.identification)?;
    validate_email(&input.email)?;
    validate_phone(&input.phone)?;
    validate_optional("address", input.address.as_deref(), 200)?;
    validate_optional("city", input.city.as_deref(), 100)?;
    validate_optional("department", input.department.as_deref(), 100)?;
    validate_optional("company_name", input.company_name.as_deref(), 200)?;
    validate_optional("notes", input.notes.as_deref(), 2000)?;
    validate_count("required_rooms", input.required_rooms)?;
    validate_count("guest_count", input.guest_count)?;

    if let Some(guest_id) = input.primary_guest_id.as_deref() {
        validate_uuid("primary_guest_id", guest_id)?;
    }

    let period = StayPeriod::new(input.check_in, input.check_out)?;
    period.ensure_not_in_past(today)?;
    Ok(period)
}

/// Validates a guest registration.
pub fn validate_new_guest(input: &NewGuest) -> ValidationResult<()> {
    validate_required("first_name", &input.first_name, 100)?;
    validate_required("last_name", &input.last_name, 100)?;
    validate_required("document_type", &input.document_type, 20)?;
    validate_document("document_number", &input.document_number)?;
    if let Some(email) = input.email.as_deref() {
        validate_email(email)?;
    }
    if let Some(phone) = input.phone.as_deref() {
        validate_phone(phone)?;
    }
    validate_optional("origin", input.origin.as_deref(), 100)?;
    validate_optional("travel_reason", input.travel_reason.as_deref(), 200)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::{TimeZone, Utc};

    fn booking() -> NewReservation {
        NewReservation {
            first_name: "Ana".to_string(),
            last_name: "Restrepo".to_string(),
            identification: "1020304050".to_string(),
            email: "ana@example.com".to_string(),
            phone: "+57 300 123 4567".to_string(),
            address: None,
            city: Some("Medellín".to_string()),
            department: None,
            company_name: None,
            notes: None,
            check_in: Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap(),
            check_out: Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap(),
            required_rooms: None,
            guest_count: Some(2),
            payment_method: PaymentMethod::Cash,
            primary_guest_id: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Suite", 10).is_ok());
        assert!(validate_required("name", "   ", 10).is_err());
        assert!(validate_required("name", &"A".repeat(11), 10).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@localhost").is_err());
        assert!(validate_email("ana@@example.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("3001234567").is_ok());
        assert!(validate_phone("+57 300-123-4567").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }

    #[test]
    fn test_new_reservation_ok() {
        let period = validate_new_reservation(&booking(), today()).unwrap();
        assert_eq!(period.nights(), 2);
    }

    #[test]
    fn test_new_reservation_rejects_inverted_dates() {
        let mut input = booking();
        input.check_out = input.check_in;
        assert!(matches!(
            validate_new_reservation(&input, today()),
            Err(ValidationError::EmptyStay)
        ));
    }

    #[test]
    fn test_new_reservation_rejects_past_check_in() {
        let later = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(matches!(
            validate_new_reservation(&booking(), later),
            Err(ValidationError::CheckInInPast { .. })
        ));
    }

    #[test]
    fn test_new_reservation_rejects_negative_counts() {
        let mut input = booking();
        input.required_rooms = Some(-1);
        assert!(validate_new_reservation(&input, today()).is_err());
    }

    #[test]
    fn test_new_guest() {
        let guest = NewGuest {
            first_name: "Luis".to_string(),
            last_name: "Gómez".to_string(),
            document_type: "CC".to_string(),
            document_number: "98765432".to_string(),
            phone: None,
            email: Some("luis@example.com".to_string()),
            origin: Some("Bogotá".to_string()),
            travel_reason: None,
        };
        assert!(validate_new_guest(&guest).is_ok());

        let mut bad = guest.clone();
        bad.document_number = "98.765.432".to_string();
        assert!(validate_new_guest(&bad).is_err());
    }
}
