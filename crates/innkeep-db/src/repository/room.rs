//! # Room Repository
//!
//! Room catalog, room assignment, manual state changes, and the room
//! overview read model.
//!
//! ## Assignment Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AssignRoom(room, reservation_id?, state)                               │
//! │                                                                         │
//! │  reservation_id given ──► assign()                                     │
//! │     touch room, touch reservation          (write lock, NotFound)      │
//! │     read count / link / other stays        (under the lock)            │
//! │     assignment::check_assignment           (limit, overlap)            │
//! │     INSERT reservation_rooms               (triggers re-check)         │
//! │     room.state = occupied                                              │
//! │                                                                         │
//! │  no reservation ──► set_state()                                        │
//! │     room.state = requested state                                       │
//! │     available/cleaning: unlink reservations whose check_out > now      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    count_assigned, fetch_reservation, fetch_room, fetch_summary, linked_stays, touch_reservation,
    touch_room, LinkedReservationRow, LINKED_RESERVATION_SELECT,
};
use crate::error::{DbError, DbResult};
use innkeep_core::assignment::{self, Assignment, Candidate};
use innkeep_core::validation::{validate_price, validate_required};
use innkeep_core::{ReservationSummary, Room, RoomCategory, RoomState};

// =============================================================================
// Inputs & Outputs
// =============================================================================

/// Catalog input for a room category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoomCategory {
    pub name: String,
    pub base_price: i64,
    pub description: Option<String>,
    pub view: Option<String>,
}

/// Catalog input for a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    pub number: String,
    pub category_id: String,
    #[serde(default)]
    pub additional_price: i64,
}

/// Result of an assignment or state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub room_id: String,
    pub state: RoomState,
    /// The reservation just linked; `None` for plain state changes.
    pub reservation: Option<ReservationSummary>,
    /// Future reservations unlinked by the state change.
    pub released: u64,
}

/// One row of the room board.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoomOverview {
    pub room_id: String,
    pub number: String,
    pub category: String,
    pub nightly_rate: i64,
    pub state: RoomState,
    /// Earliest confirmed linked reservation that has not ended yet.
    #[sqlx(skip)]
    pub current: Option<ReservationSummary>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for rooms and room assignment.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Creates a new RoomRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RoomRepository { pool }
    }

    /// Inserts a room category.
    pub async fn insert_category(&self, input: &NewRoomCategory) -> DbResult<RoomCategory> {
        validate_required("name", &input.name, 100)?;
        validate_price("base_price", input.base_price)?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        debug!(id = %id, name = %input.name, "Inserting room category");

        let category = sqlx::query_as::<_, RoomCategory>(
            r#"
            INSERT INTO room_categories (id, name, base_price, description, view, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(input.base_price)
        .bind(&input.description)
        .bind(&input.view)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a room. New rooms start Available.
    pub async fn insert(&self, input: &NewRoom) -> DbResult<Room> {
        validate_required("number", &input.number, 20)?;
        validate_price("additional_price", input.additional_price)?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        debug!(id = %id, number = %input.number, "Inserting room");

        let room = sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (id, number, category_id, additional_price, state, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(input.number.trim())
        .bind(&input.category_id)
        .bind(input.additional_price)
        .bind(RoomState::Available)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(room)
    }

    /// Gets a room by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(room)
    }

    /// Links a room to a reservation and marks it Occupied.
    ///
    /// Assigning a room the reservation already holds skips the limit check
    /// and only refreshes the room state.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown room or reservation
    /// - `RoomLimitReached`, `DateConflict` from the rule check
    /// - `ConstraintViolation` if a trigger catches what the rule missed
    pub async fn assign(&self, room_id: &str, reservation_id: &str) -> DbResult<AssignmentOutcome> {
        debug!(room_id = %room_id, reservation_id = %reservation_id, "Assigning room");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_room(&mut *tx, room_id, now).await?;
        touch_reservation(&mut *tx, reservation_id, now).await?;

        let room = fetch_room(&mut *tx, room_id).await?;
        let reservation = fetch_reservation(&mut *tx, reservation_id).await?;
        let assigned_rooms = count_assigned(&mut *tx, reservation_id).await?;
        let linked = linked_stays(&mut *tx, room_id).await?;
        let already_assigned = linked.iter().any(|s| s.reservation_id == reservation_id);

        let candidate = Candidate {
            reservation_id,
            period: reservation.period(),
            required_rooms: reservation.required_rooms,
            assigned_rooms,
            already_assigned,
        };
        let plan = assignment::check_assignment(&room.number, &candidate, &linked)?;

        if plan == Assignment::Link {
            sqlx::query(
                "INSERT INTO reservation_rooms (reservation_id, room_id, assigned_at) VALUES (?1, ?2, ?3)",
            )
            .bind(reservation_id)
            .bind(room_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE rooms SET state = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(room_id)
            .bind(RoomState::Occupied)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let summary = fetch_summary(&mut *tx, room_id, reservation_id).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            room = %room.number,
            reservation_id = %reservation_id,
            newly_linked = plan == Assignment::Link,
            "Room assigned"
        );

        Ok(AssignmentOutcome {
            room_id: room_id.to_string(),
            state: RoomState::Occupied,
            reservation: Some(summary),
            released: 0,
        })
    }

    /// Sets a room's state without a reservation.
    ///
    /// Available and Cleaning release the room: every linked reservation
    /// whose check-out is after `now` is unlinked. Past stays keep their link.
    pub async fn set_state(
        &self,
        room_id: &str,
        state: RoomState,
        now: DateTime<Utc>,
    ) -> DbResult<AssignmentOutcome> {
        debug!(room_id = %room_id, state = %state, "Setting room state");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE rooms SET state = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(room_id)
            .bind(state)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Room", room_id));
        }

        let released = if state.releases_future_bookings() {
            sqlx::query(
                r#"
                DELETE FROM reservation_rooms
                WHERE room_id = ?1
                  AND reservation_id IN (
                      SELECT id FROM reservations
                      WHERE julianday(check_out) > julianday(?2)
                  )
                "#,
            )
            .bind(room_id)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .rows_affected()
        } else {
            0
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(room_id = %room_id, state = %state, released, "Room state changed");

        Ok(AssignmentOutcome {
            room_id: room_id.to_string(),
            state,
            reservation: None,
            released,
        })
    }

    /// Lists every room with its rate, state, and current reservation.
    ///
    /// The current reservation is computed on each call from the
    /// assignment table; nothing is cached.
    pub async fn overview(&self, now: DateTime<Utc>) -> DbResult<Vec<RoomOverview>> {
        let mut rooms = sqlx::query_as::<_, RoomOverview>(
            r#"
            SELECT
                r.id AS room_id,
                r.number,
                c.name AS category,
                c.base_price + r.additional_price AS nightly_rate,
                r.state
            FROM rooms r
            JOIN room_categories c ON c.id = r.category_id
            ORDER BY r.number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let sql = format!(
            "{LINKED_RESERVATION_SELECT} \
             WHERE r.booking_status = 'confirmed' AND julianday(r.check_out) > julianday(?1) \
             ORDER BY julianday(r.check_in)"
        );
        let linked = sqlx::query_as::<_, LinkedReservationRow>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        // rows arrive by check-in, so the first per room wins
        let mut current: HashMap<String, ReservationSummary> = HashMap::new();
        for row in linked {
            if !current.contains_key(&row.room_id) {
                let room_id = row.room_id.clone();
                current.insert(room_id, row.into_summary());
            }
        }

        for room in &mut rooms {
            room.current = current.remove(&room.room_id);
        }

        debug!(count = rooms.len(), "Room overview built");
        Ok(rooms)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
