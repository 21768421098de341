//! # Repository Module
//!
//! Database repository implementations for the front desk.
//!
//! ## Write Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Every multi-row operation                            │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  1. first statement is a WRITE                                         │
//! │     "touch" the row (UPDATE ... SET updated_at) or the guarded         │
//! │     UPDATE itself (stock = stock - n WHERE stock >= n)                 │
//! │     → takes SQLite's write lock; competing writers queue here          │
//! │     → 0 rows affected = NotFound                                       │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  2. read the rows the rule needs (under the lock, never cached)        │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  3. innkeep-core rule check ── Err ──► drop tx (ROLLBACK), nothing     │
//! │    │                                    was changed                     │
//! │    ▼                                                                    │
//! │  4. business writes (triggers re-check overlap and limits)             │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Helpers in this module take `&mut SqliteConnection` so they run on the
//! open transaction. Nothing inside a transaction touches the pool: the
//! in-memory test database has a single connection.
//!
//! ## Available Repositories
//!
//! - [`room::RoomRepository`] - Catalog, assignment, state changes, overview
//! - [`reservation::ReservationRepository`] - Booking, lifecycle, companions
//! - [`guest::GuestRepository`] - Guest registry
//! - [`invoice::InvoiceRepository`] - Invoice generation and payment
//! - [`product::ProductRepository`] - Minibar catalog and stock
//! - [`consumption::ConsumptionRepository`] - Consumption ledger

pub mod consumption;
pub mod guest;
pub mod invoice;
pub mod product;
pub mod reservation;
pub mod room;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};

use crate::error::{DbError, DbResult};
use innkeep_core::assignment::LinkedStay;
use innkeep_core::{Consumption, Invoice, Reservation, ReservationSummary, Room, RoomRate};

// =============================================================================
// Row Locks
// =============================================================================

/// Opens the transaction with a write on the room row.
pub(crate) async fn touch_room(
    conn: &mut SqliteConnection,
    room_id: &str,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE rooms SET updated_at = ?2 WHERE id = ?1")
        .bind(room_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Room", room_id));
    }
    Ok(())
}

/// Opens the transaction with a write on the reservation row.
pub(crate) async fn touch_reservation(
    conn: &mut SqliteConnection,
    reservation_id: &str,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE reservations SET updated_at = ?2 WHERE id = ?1")
        .bind(reservation_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Reservation", reservation_id));
    }
    Ok(())
}

// =============================================================================
// Shared Reads
// =============================================================================

pub(crate) async fn fetch_room(conn: &mut SqliteConnection, room_id: &str) -> DbResult<Room> {
    sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?1")
        .bind(room_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Room", room_id))
}

pub(crate) async fn fetch_reservation(
    conn: &mut SqliteConnection,
    reservation_id: &str,
) -> DbResult<Reservation> {
    sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?1")
        .bind(reservation_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Reservation", reservation_id))
}

pub(crate) async fn count_assigned(conn: &mut SqliteConnection, reservation_id: &str) -> DbResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reservation_rooms WHERE reservation_id = ?1")
            .bind(reservation_id)
            .fetch_one(&mut *conn)
            .await?;
    Ok(count)
}

/// Rooms held by a reservation with their current nightly price.
pub(crate) async fn assigned_rates(
    conn: &mut SqliteConnection,
    reservation_id: &str,
) -> DbResult<Vec<RoomRate>> {
    let rates = sqlx::query_as::<_, RoomRate>(
        r#"
        SELECT
            r.id AS room_id,
            r.number,
            c.name AS category_name,
            c.base_price,
            r.additional_price
        FROM reservation_rooms rr
        JOIN rooms r ON r.id = rr.room_id
        JOIN room_categories c ON c.id = r.category_id
        WHERE rr.reservation_id = ?1
        ORDER BY r.number
        "#,
    )
    .bind(reservation_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rates)
}

/// Every reservation linked to a room, with its stay.
pub(crate) async fn linked_stays(conn: &mut SqliteConnection, room_id: &str) -> DbResult<Vec<LinkedStay>> {
    let stays = sqlx::query_as::<_, LinkedStay>(
        r#"
        SELECT r.id AS reservation_id, r.check_in, r.check_out
        FROM reservation_rooms rr
        JOIN reservations r ON r.id = rr.reservation_id
        WHERE rr.room_id = ?1
        ORDER BY julianday(r.check_in)
        "#,
    )
    .bind(room_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(stays)
}

pub(crate) async fn invoice_for_reservation(
    conn: &mut SqliteConnection,
    reservation_id: &str,
) -> DbResult<Option<Invoice>> {
    let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE reservation_id = ?1")
        .bind(reservation_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(invoice)
}

pub(crate) async fn unsettled_consumptions(
    conn: &mut SqliteConnection,
    reservation_id: &str,
) -> DbResult<Vec<Consumption>> {
    let items = sqlx::query_as::<_, Consumption>(
        r#"
        SELECT * FROM consumptions
        WHERE reservation_id = ?1 AND settled = 0
        ORDER BY consumed_at
        "#,
    )
    .bind(reservation_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(items)
}

// =============================================================================
// Reservation Summaries
// =============================================================================

/// A reservation linked to a room, with the primary guest's name if any.
#[derive(Debug, FromRow)]
pub(crate) struct LinkedReservationRow {
    pub room_id: String,
    pub reservation_id: String,
    pub booked_name: String,
    pub guest_name: Option<String>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

impl LinkedReservationRow {
    pub fn into_summary(self) -> ReservationSummary {
        ReservationSummary {
            id: self.reservation_id,
            guest_name: self.guest_name.unwrap_or(self.booked_name),
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }
}

/// Select list shared by the summary queries. Joins `reservation_rooms rr`,
/// `reservations r`, and `guests g`.
pub(crate) const LINKED_RESERVATION_SELECT: &str = r#"
    SELECT
        rr.room_id,
        r.id AS reservation_id,
        r.first_name || ' ' || r.last_name AS booked_name,
        g.first_name || ' ' || g.last_name AS guest_name,
        r.check_in,
        r.check_out
    FROM reservation_rooms rr
    JOIN reservations r ON r.id = rr.reservation_id
    LEFT JOIN guests g ON g.id = r.primary_guest_id
"#;

pub(crate) async fn fetch_summary(
    conn: &mut SqliteConnection,
    room_id: &str,
    reservation_id: &str,
) -> DbResult<ReservationSummary> {
    let sql = format!(
        "{LINKED_RESERVATION_SELECT} WHERE rr.room_id = ?1 AND rr.reservation_id = ?2"
    );
    let row = sqlx::query_as::<_, LinkedReservationRow>(&sql)
        .bind(room_id)
        .bind(reservation_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Room assignment", reservation_id))?;

    Ok(row.into_summary())
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::TempDir;

    use crate::repository::product::NewProduct;
    use crate::repository::room::{NewRoom, NewRoomCategory};
    use crate::{Database, DbConfig};
    use innkeep_core::{
        Guest, NewGuest, NewReservation, PaymentMethod, Product, Reservation, Room,
    };

    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// A database file with a real pool, for tests where writers race.
    ///
    /// Keep the `TempDir` alive for the whole test.
    pub async fn file_db() -> (Database, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("front-desk.db"))
            .max_connections(8)
            .busy_timeout(Duration::from_secs(10));
        (Database::new(config).await.unwrap(), dir)
    }

    pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    /// A room priced `base + extra` in its own category.
    pub async fn room(db: &Database, number: &str, base: i64, extra: i64) -> Room {
        let category = db
            .rooms()
            .insert_category(&NewRoomCategory {
                name: format!("Category {number}"),
                base_price: base,
                description: None,
                view: None,
            })
            .await
            .unwrap();

        db.rooms()
            .insert(&NewRoom {
                number: number.to_string(),
                category_id: category.id,
                additional_price: extra,
            })
            .await
            .unwrap()
    }

    pub async fn guest(db: &Database, document: &str) -> Guest {
        db.guests()
            .register(&NewGuest {
                first_name: "Ana".to_string(),
                last_name: "Restrepo".to_string(),
                document_type: "CC".to_string(),
                document_number: document.to_string(),
                phone: None,
                email: None,
                origin: None,
                travel_reason: None,
            })
            .await
            .unwrap()
    }

    pub fn booking(
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        required_rooms: Option<i64>,
        primary_guest_id: Option<String>,
    ) -> NewReservation {
        NewReservation {
            first_name: "Ana".to_string(),
            last_name: "Restrepo".to_string(),
            identification: "1020304050".to_string(),
            email: "ana@example.com".to_string(),
            phone: "3001234567".to_string(),
            address: None,
            city: None,
            department: None,
            company_name: None,
            notes: None,
            check_in,
            check_out,
            required_rooms,
            guest_count: Some(1),
            payment_method: PaymentMethod::Cash,
            primary_guest_id,
        }
    }

    /// Books a stay as if today were the check-in date.
    pub async fn reservation(
        db: &Database,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        required_rooms: Option<i64>,
        primary_guest_id: Option<String>,
    ) -> Reservation {
        db.reservations()
            .create(
                &booking(check_in, check_out, required_rooms, primary_guest_id),
                check_in.date_naive(),
            )
            .await
            .unwrap()
    }

    pub async fn product(db: &Database, name: &str, price: i64, stock: i64) -> Product {
        db.products()
            .insert(&NewProduct {
                name: name.to_string(),
                price,
                stock,
                photo: None,
            })
            .await
            .unwrap()
    }
}
