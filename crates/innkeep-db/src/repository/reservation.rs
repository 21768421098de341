//! # Reservation Repository
//!
//! Booking, the stay lifecycle, companions, and deletion.
//!
//! ## Stay Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. create()                 Pending / Unconfirmed, no rooms            │
//! │  2. toggle_confirmation()    Unconfirmed ⇄ Confirmed                    │
//! │  3. rooms().assign()         rooms linked, marked Occupied              │
//! │  4. check_in()               Pending → Active, rooms → Occupied         │
//! │  5. invoices().generate()    frozen invoice, then mark_paid()           │
//! │  6. check_out()              Active → Completed, rooms → Cleaning       │
//! │                                                                         │
//! │  delete() at any point: unlink rooms, try to delete the invoice        │
//! │  (a paid invoice is kept and reported as a warning), delete the row    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Check-in and check-out write the reservation and all of its rooms in one
//! transaction.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    assigned_rates, count_assigned, fetch_reservation, invoice_for_reservation, linked_stays,
    touch_reservation,
};
use crate::error::{DbError, DbResult};
use innkeep_core::assignment;
use innkeep_core::lifecycle;
use innkeep_core::stay::{self, StayPeriod};
use innkeep_core::validation::{validate_count, validate_new_reservation};
use innkeep_core::{
    BookingStatus, Guest, NewReservation, Reservation, ReservationDetail, RoomRate, RoomState,
    StayState, StayUpdate,
};

/// What a reservation deletion did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub reservation_id: String,
    pub unlinked_rooms: u64,
    pub invoice_deleted: bool,
    /// Best-effort steps that did not happen.
    pub warnings: Vec<String>,
}

/// Repository for reservations.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    /// Creates a new ReservationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// Books a stay. `today` is the caller's current date.
    pub async fn create(&self, input: &NewReservation, today: NaiveDate) -> DbResult<Reservation> {
        let period = validate_new_reservation(input, today)?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        debug!(id = %id, nights = period.nights(), "Creating reservation");

        let mut tx = self.pool.begin().await?;

        // the INSERT comes first so the write lock is taken up front; an
        // unknown guest resolves to NULL and is rejected below
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (
                id, first_name, last_name, identification, email, phone,
                address, city, department, company_name, notes,
                check_in, check_out, required_rooms, guest_count, payment_method,
                stay_state, booking_status, primary_guest_id, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15, ?16,
                ?17, ?18, (SELECT id FROM guests WHERE id = ?19), ?20, ?20
            )
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(input.identification.trim())
        .bind(input.email.trim())
        .bind(input.phone.trim())
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.department)
        .bind(&input.company_name)
        .bind(&input.notes)
        .bind(period.check_in)
        .bind(period.check_out)
        .bind(input.required_rooms)
        .bind(input.guest_count)
        .bind(input.payment_method)
        .bind(StayState::Pending)
        .bind(BookingStatus::Unconfirmed)
        .bind(&input.primary_guest_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(guest_id) = input.primary_guest_id.as_deref() {
            if reservation.primary_guest_id.is_none() {
                return Err(DbError::not_found("Guest", guest_id));
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %reservation.id, "Reservation created");
        Ok(reservation)
    }

    /// Gets a reservation by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Reservation>> {
        let reservation = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reservation)
    }

    /// Lists reservations by check-in date, most recent first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations ORDER BY julianday(check_in) DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(reservations)
    }

    /// Required room count (defaulted) against rooms currently assigned.
    pub async fn detail(&self, id: &str) -> DbResult<ReservationDetail> {
        let mut conn = self.pool.acquire().await?;

        let reservation = fetch_reservation(&mut conn, id).await?;
        let assigned_rooms = count_assigned(&mut conn, id).await?;

        Ok(ReservationDetail {
            reservation_id: reservation.id,
            required_rooms: stay::room_limit(reservation.required_rooms),
            assigned_rooms,
        })
    }

    /// Rooms held by the reservation with their current nightly rate.
    pub async fn rooms(&self, id: &str) -> DbResult<Vec<RoomRate>> {
        let mut conn = self.pool.acquire().await?;

        fetch_reservation(&mut conn, id).await?;
        assigned_rates(&mut conn, id).await
    }

    /// Flips the booking status. No other precondition.
    pub async fn toggle_confirmation(&self, id: &str) -> DbResult<BookingStatus> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_reservation(&mut *tx, id, now).await?;
        let reservation = fetch_reservation(&mut *tx, id).await?;
        let status = reservation.booking_status.toggled();

        sqlx::query("UPDATE reservations SET booking_status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, status = ?status, "Booking status toggled");
        Ok(status)
    }

    /// Links a registered guest as the one billed for the stay.
    pub async fn set_primary_guest(&self, id: &str, guest_id: &str) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_reservation(&mut *tx, id, now).await?;
        ensure_guest(&mut tx, guest_id).await?;

        sqlx::query("UPDATE reservations SET primary_guest_id = ?2 WHERE id = ?1")
            .bind(id)
            .bind(guest_id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    /// Pending → Active. Every assigned room becomes Occupied.
    pub async fn check_in(&self, id: &str) -> DbResult<StayState> {
        debug!(id = %id, "Checking in");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_reservation(&mut *tx, id, now).await?;
        let reservation = fetch_reservation(&mut *tx, id).await?;
        let assigned_rooms = count_assigned(&mut *tx, id).await?;

        let state = lifecycle::check_in(&reservation, assigned_rooms)?;
        self.write_stay(&mut tx, id, state, RoomState::Occupied, now).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, rooms = assigned_rooms, "Guest checked in");
        Ok(state)
    }

    /// Active → Completed. Requires a paid invoice; rooms become Cleaning.
    pub async fn check_out(&self, id: &str) -> DbResult<StayState> {
        debug!(id = %id, "Checking out");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_reservation(&mut *tx, id, now).await?;
        let reservation = fetch_reservation(&mut *tx, id).await?;
        let invoice = invoice_for_reservation(&mut *tx, id).await?;

        let state = lifecycle::check_out(&reservation, invoice.as_ref())?;
        self.write_stay(&mut tx, id, state, RoomState::Cleaning, now).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, "Guest checked out");
        Ok(state)
    }

    async fn write_stay(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        id: &str,
        stay: StayState,
        rooms: RoomState,
        now: chrono::DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query("UPDATE reservations SET stay_state = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(stay)
            .bind(now)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE rooms SET state = ?2, updated_at = ?3
            WHERE id IN (SELECT room_id FROM reservation_rooms WHERE reservation_id = ?1)
            "#,
        )
        .bind(id)
        .bind(rooms)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Changes the dates and/or room count of a stay that has not ended.
    ///
    /// The new dates may not overlap another stay on any room this
    /// reservation holds, and the new count may not drop below the rooms
    /// already assigned.
    pub async fn update_stay(&self, id: &str, update: &StayUpdate) -> DbResult<Reservation> {
        debug!(id = %id, "Updating stay");
        validate_count("required_rooms", update.required_rooms)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_reservation(&mut *tx, id, now).await?;
        let current = fetch_reservation(&mut *tx, id).await?;
        lifecycle::ensure_editable(&current)?;

        let period = StayPeriod::new(
            update.check_in.unwrap_or(current.check_in),
            update.check_out.unwrap_or(current.check_out),
        )?;
        let required_rooms = update.required_rooms.or(current.required_rooms);

        let assigned = count_assigned(&mut *tx, id).await?;
        assignment::check_room_count_change(id, required_rooms, assigned)?;

        for rate in assigned_rates(&mut *tx, id).await? {
            let linked = linked_stays(&mut *tx, &rate.room_id).await?;
            assignment::ensure_no_conflict(&rate.number, id, &period, &linked)?;
        }

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET check_in = ?2, check_out = ?3, required_rooms = ?4, updated_at = ?5
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(period.check_in)
        .bind(period.check_out)
        .bind(required_rooms)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, nights = period.nights(), "Stay updated");
        Ok(reservation)
    }

    /// Deletes a reservation from any state.
    ///
    /// ## Steps
    /// 1. Unlink its rooms (rooms themselves stay)
    /// 2. Try to delete its invoice inside a savepoint; a protected (paid)
    ///    invoice is kept and the failure is returned as a warning
    /// 3. Delete the reservation (consumptions and companions cascade)
    pub async fn delete(&self, id: &str) -> DbResult<DeleteOutcome> {
        debug!(id = %id, "Deleting reservation");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_reservation(&mut *tx, id, now).await?;

        let unlinked_rooms = sqlx::query("DELETE FROM reservation_rooms WHERE reservation_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut outcome = DeleteOutcome {
            reservation_id: id.to_string(),
            unlinked_rooms,
            ..DeleteOutcome::default()
        };

        let mut savepoint = tx.begin().await?;
        match sqlx::query("DELETE FROM invoices WHERE reservation_id = ?1")
            .bind(id)
            .execute(&mut *savepoint)
            .await
        {
            Ok(result) => {
                savepoint.commit().await?;
                outcome.invoice_deleted = result.rows_affected() > 0;
            }
            Err(err) => {
                savepoint.rollback().await?;
                let err = DbError::from(err);
                warn!(id = %id, error = %err, "Invoice kept while deleting reservation");
                outcome
                    .warnings
                    .push(format!("Invoice of reservation {id} was not deleted: {err}"));
            }
        }

        sqlx::query("DELETE FROM reservations WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %id,
            unlinked_rooms,
            invoice_deleted = outcome.invoice_deleted,
            warnings = outcome.warnings.len(),
            "Reservation deleted"
        );
        Ok(outcome)
    }

    // =========================================================================
    // Companions
    // =========================================================================

    /// Adds a companion guest. Adding the same guest twice is a no-op.
    pub async fn add_companion(&self, id: &str, guest_id: &str) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_reservation(&mut *tx, id, now).await?;
        ensure_guest(&mut tx, guest_id).await?;

        sqlx::query(
            r#"
            INSERT INTO reservation_companions (reservation_id, guest_id, added_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (reservation_id, guest_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(guest_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    /// Removes a companion. Returns whether a link was removed.
    pub async fn remove_companion(&self, id: &str, guest_id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            "DELETE FROM reservation_companions WHERE reservation_id = ?1 AND guest_id = ?2",
        )
        .bind(id)
        .bind(guest_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists companion guests.
    pub async fn companions(&self, id: &str) -> DbResult<Vec<Guest>> {
        let guests = sqlx::query_as::<_, Guest>(
            r#"
            SELECT g.*
            FROM reservation_companions rc
            JOIN guests g ON g.id = rc.guest_id
            WHERE rc.reservation_id = ?1
            ORDER BY rc.added_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(guests)
    }
}

async fn ensure_guest(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, guest_id: &str) -> DbResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM guests WHERE id = ?1)")
        .bind(guest_id)
        .fetch_one(&mut **tx)
        .await?;

    if !exists {
        return Err(DbError::not_found("Guest", guest_id));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{at, booking, db, file_db, guest, reservation, room};
    use innkeep_core::{CoreError, InvoiceStatus, ValidationError};

    #[tokio::test]
    async fn test_create_defaults() {
        let db = db().await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, None).await;

        assert_eq!(res.stay_state, StayState::Pending);
        assert_eq!(res.booking_status, BookingStatus::Unconfirmed);
        assert_eq!(res.check_in, at(2024, 1, 1, 14));

        let detail = db.reservations().detail(&res.id).await.unwrap();
        assert_eq!(detail.required_rooms, 1);
        assert_eq!(detail.assigned_rooms, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_past_and_empty_stays() {
        let db = db().await;
        let today = at(2024, 1, 5, 0).date_naive();

        let past = booking(at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, None);
        let err = db.reservations().create(&past, today).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::Validation(ValidationError::CheckInInPast { .. }))
        ));

        let empty = booking(at(2024, 1, 6, 14), at(2024, 1, 6, 14), None, None);
        let err = db.reservations().create(&empty, today).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::Validation(ValidationError::EmptyStay))
        ));
    }

    #[tokio::test]
    async fn test_create_with_unknown_guest() {
        let db = db().await;
        let input = booking(
            at(2024, 1, 1, 14),
            at(2024, 1, 3, 12),
            None,
            Some(Uuid::new_v4().to_string()),
        );
        let err = db
            .reservations()
            .create(&input, at(2024, 1, 1, 0).date_naive())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Guest"));

        // the row written before the guest check is rolled back
        assert!(db.reservations().list(10).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_bookings_with_guest_all_land() {
        let (db, _dir) = file_db().await;
        let g = guest(&db, "131").await;

        let tasks: Vec<_> = (0..8)
            .map(|day| {
                let reservations = db.reservations();
                let input = booking(
                    at(2024, 2, 1 + day, 14),
                    at(2024, 2, 2 + day, 12),
                    None,
                    Some(g.id.clone()),
                );
                tokio::spawn(async move {
                    reservations
                        .create(&input, at(2024, 2, 1, 0).date_naive())
                        .await
                })
            })
            .collect();

        for task in tasks {
            let created = task.await.unwrap().unwrap();
            assert_eq!(created.primary_guest_id.as_deref(), Some(g.id.as_str()));
        }
        assert_eq!(db.reservations().list(50).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_toggle_confirmation_flips_both_ways() {
        let db = db().await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, None).await;

        assert_eq!(
            db.reservations().toggle_confirmation(&res.id).await.unwrap(),
            BookingStatus::Confirmed
        );
        assert_eq!(
            db.reservations().toggle_confirmation(&res.id).await.unwrap(),
            BookingStatus::Unconfirmed
        );
    }

    #[tokio::test]
    async fn test_check_in_preconditions_leave_no_trace() {
        let db = db().await;
        let r101 = room(&db, "101", 100_000, 0).await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, None).await;

        let err = db.reservations().check_in(&res.id).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::NotConfirmed(_))));

        db.reservations().toggle_confirmation(&res.id).await.unwrap();
        let err = db.reservations().check_in(&res.id).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::NoRoomsAssigned(_))));

        let stored = db.reservations().get_by_id(&res.id).await.unwrap().unwrap();
        assert_eq!(stored.stay_state, StayState::Pending);

        db.rooms().assign(&r101.id, &res.id).await.unwrap();
        db.rooms()
            .set_state(&r101.id, RoomState::Maintenance, at(2024, 1, 1, 8))
            .await
            .unwrap();

        assert_eq!(
            db.reservations().check_in(&res.id).await.unwrap(),
            StayState::Active
        );
        let room = db.rooms().get_by_id(&r101.id).await.unwrap().unwrap();
        assert_eq!(room.state, RoomState::Occupied);

        let err = db.reservations().check_in(&res.id).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::AlreadyCheckedIn(_))));
    }

    #[tokio::test]
    async fn test_check_out_requires_paid_invoice() {
        let db = db().await;
        let a = room(&db, "101", 100_000, 20_000).await;
        let b = room(&db, "102", 80_000, 0).await;
        let g = guest(&db, "555").await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), Some(2), Some(g.id)).await;

        db.reservations().toggle_confirmation(&res.id).await.unwrap();
        db.rooms().assign(&a.id, &res.id).await.unwrap();
        db.rooms().assign(&b.id, &res.id).await.unwrap();

        let err = db.reservations().check_out(&res.id).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::NotCheckedIn(_))));

        db.reservations().check_in(&res.id).await.unwrap();

        let err = db.reservations().check_out(&res.id).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::InvoiceMissing(_))));

        let invoice = db.invoices().generate(&res.id, at(2024, 1, 3, 10)).await.unwrap();
        let err = db.reservations().check_out(&res.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::InvoiceUnpaid { status: InvoiceStatus::Pending, .. })
        ));

        db.invoices().mark_paid(&invoice.id).await.unwrap();
        assert_eq!(
            db.reservations().check_out(&res.id).await.unwrap(),
            StayState::Completed
        );

        for id in [&a.id, &b.id] {
            let room = db.rooms().get_by_id(id).await.unwrap().unwrap();
            assert_eq!(room.state, RoomState::Cleaning);
        }

        let err = db.reservations().check_out(&res.id).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::AlreadyCheckedOut(_))));
    }

    #[tokio::test]
    async fn test_update_stay_rejects_overlap_and_low_count() {
        let db = db().await;
        let r101 = room(&db, "101", 100_000, 0).await;
        let r102 = room(&db, "102", 100_000, 0).await;
        let first = reservation(&db, at(2024, 3, 1, 14), at(2024, 3, 4, 12), None, None).await;
        let second = reservation(&db, at(2024, 3, 5, 14), at(2024, 3, 8, 12), Some(2), None).await;
        db.rooms().assign(&r101.id, &first.id).await.unwrap();
        db.rooms().assign(&r101.id, &second.id).await.unwrap();
        db.rooms().assign(&r102.id, &second.id).await.unwrap();

        let earlier = StayUpdate {
            check_in: Some(at(2024, 3, 3, 14)),
            ..StayUpdate::default()
        };
        let err = db.reservations().update_stay(&second.id, &earlier).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::DateConflict { .. })));

        let fewer = StayUpdate {
            required_rooms: Some(1),
            ..StayUpdate::default()
        };
        let err = db.reservations().update_stay(&second.id, &fewer).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::RoomCountBelowAssigned { .. })));

        let longer = StayUpdate {
            check_out: Some(at(2024, 3, 10, 12)),
            ..StayUpdate::default()
        };
        let updated = db.reservations().update_stay(&second.id, &longer).await.unwrap();
        assert_eq!(updated.check_out, at(2024, 3, 10, 12));
        assert_eq!(updated.required_rooms, Some(2));
    }

    #[tokio::test]
    async fn test_delete_unlinks_rooms_and_deletes_pending_invoice() {
        let db = db().await;
        let r101 = room(&db, "101", 100_000, 0).await;
        let g = guest(&db, "777").await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, Some(g.id)).await;
        db.rooms().assign(&r101.id, &res.id).await.unwrap();
        let invoice = db.invoices().generate(&res.id, at(2024, 1, 3, 10)).await.unwrap();

        let outcome = db.reservations().delete(&res.id).await.unwrap();

        assert_eq!(outcome.unlinked_rooms, 1);
        assert!(outcome.invoice_deleted);
        assert!(outcome.warnings.is_empty());
        assert!(db.reservations().get_by_id(&res.id).await.unwrap().is_none());
        assert!(db.invoices().get_by_id(&invoice.id).await.unwrap().is_none());
        assert!(db.rooms().get_by_id(&r101.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_keeps_paid_invoice_with_warning() {
        let db = db().await;
        let r101 = room(&db, "101", 100_000, 0).await;
        let g = guest(&db, "888").await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, Some(g.id)).await;
        db.rooms().assign(&r101.id, &res.id).await.unwrap();
        let invoice = db.invoices().generate(&res.id, at(2024, 1, 3, 10)).await.unwrap();
        db.invoices().mark_paid(&invoice.id).await.unwrap();

        let outcome = db.reservations().delete(&res.id).await.unwrap();

        assert!(!outcome.invoice_deleted);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(db.reservations().get_by_id(&res.id).await.unwrap().is_none());

        let kept = db.invoices().get_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(kept.status, InvoiceStatus::Paid);
        assert!(kept.reservation_id.is_none());
        assert_eq!(kept.total, 238_000);
    }

    #[tokio::test]
    async fn test_delete_unknown_reservation() {
        let db = db().await;
        let err = db.reservations().delete("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_companions() {
        let db = db().await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, None).await;
        let a = guest(&db, "1001").await;

        db.reservations().add_companion(&res.id, &a.id).await.unwrap();
        db.reservations().add_companion(&res.id, &a.id).await.unwrap();
        assert_eq!(db.reservations().companions(&res.id).await.unwrap().len(), 1);

        assert!(db.reservations().remove_companion(&res.id, &a.id).await.unwrap());
        assert!(db.reservations().companions(&res.id).await.unwrap().is_empty());

        let err = db
            .reservations()
            .add_companion(&res.id, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
