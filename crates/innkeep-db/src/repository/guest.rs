//! # Guest Repository
//!
//! The guest registry, limited to what the front desk core needs.
//!
//! Document uniqueness is checked twice: a lookup before the insert gives
//! the friendly `Duplicate` message, and the `UNIQUE(document_type,
//! document_number)` constraint catches a concurrent registration.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use innkeep_core::validation::validate_new_guest;
use innkeep_core::{Guest, NewGuest, ValidationError};

/// Repository for guests.
#[derive(Debug, Clone)]
pub struct GuestRepository {
    pool: SqlitePool,
}

impl GuestRepository {
    /// Creates a new GuestRepository.
    pub fn new(pool: SqlitePool) -> Self {
        GuestRepository { pool }
    }

    /// Registers a guest.
    ///
    /// ## Errors
    /// - `Validation(Duplicate)` if the document is already registered
    /// - `UniqueViolation` if a concurrent request registered it first
    pub async fn register(&self, input: &NewGuest) -> DbResult<Guest> {
        validate_new_guest(input)?;

        let document_type = input.document_type.trim().to_uppercase();
        let document_number = input.document_number.trim();

        if self
            .find_by_document(&document_type, document_number)
            .await?
            .is_some()
        {
            return Err(ValidationError::Duplicate {
                field: "document_number".to_string(),
                value: format!("{document_type} {document_number}"),
            }
            .into());
        }

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        debug!(id = %id, document_type = %document_type, "Registering guest");

        let guest = sqlx::query_as::<_, Guest>(
            r#"
            INSERT INTO guests (
                id, first_name, last_name, document_type, document_number,
                phone, email, origin, travel_reason, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(&document_type)
        .bind(document_number)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.origin)
        .bind(&input.travel_reason)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!(id = %guest.id, "Guest registered");
        Ok(guest)
    }

    /// Gets a guest by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Guest>> {
        let guest = sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(guest)
    }

    /// Finds a guest by identity document.
    pub async fn find_by_document(
        &self,
        document_type: &str,
        document_number: &str,
    ) -> DbResult<Option<Guest>> {
        let guest = sqlx::query_as::<_, Guest>(
            "SELECT * FROM guests WHERE document_type = ?1 AND document_number = ?2",
        )
        .bind(document_type.trim().to_uppercase())
        .bind(document_number.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(guest)
    }

    /// Deletes a guest. Reservations that named them as primary guest keep
    /// existing with no primary guest.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM guests WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Guest", id));
        }

        info!(id = %id, "Guest deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
