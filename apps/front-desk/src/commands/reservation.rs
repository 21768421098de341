//! # Reservation Commands
//!
//! Booking, confirmation, the stay lifecycle, and companions.
//!
//! ## Stay Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  POST /api/reservations ──► Pending (unconfirmed, no rooms)            │
//! │                                │                                        │
//! │        POST .../confirmation   │   POST /api/rooms/{id}/assign          │
//! │                                ▼                                        │
//! │                 POST .../check-in (confirmed + ≥ 1 room)                │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                             Active                                      │
//! │                                │                                        │
//! │                 POST .../check-out (paid invoice)                       │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                           Completed                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::state::AppState;
use innkeep_core::{
    BookingStatus, Guest, NewReservation, Reservation, ReservationDetail, RoomRate, StayState,
    StayUpdate,
};
use innkeep_db::DeleteOutcome;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reservations", get(list_reservations).post(create_reservation))
        .route(
            "/api/reservations/{id}",
            get(get_reservation).delete(delete_reservation),
        )
        .route("/api/reservations/{id}/detail", get(reservation_detail))
        .route("/api/reservations/{id}/rooms", get(reservation_rooms))
        .route("/api/reservations/{id}/stay", put(update_stay))
        .route("/api/reservations/{id}/confirmation", post(toggle_confirmation))
        .route("/api/reservations/{id}/check-in", post(check_in))
        .route("/api/reservations/{id}/check-out", post(check_out))
        .route("/api/reservations/{id}/primary-guest", put(set_primary_guest))
        .route(
            "/api/reservations/{id}/companions",
            get(list_companions).post(add_companion),
        )
        .route(
            "/api/reservations/{id}/companions/{guest_id}",
            delete(remove_companion),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct GuestRef {
    pub guest_id: String,
}

#[derive(Debug, Serialize)]
pub struct StayChange {
    pub reservation_id: String,
    pub stay_state: StayState,
}

/// GET /api/reservations?limit=N - most recent check-ins first.
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Reservation>> {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    let reservations = state.db.reservations().list(limit).await?;
    Ok(ApiResponse::ok(
        format!("{} reservations", reservations.len()),
        reservations,
    ))
}

/// POST /api/reservations
///
/// The check-in date may not be before today (server clock, UTC).
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(body): Json<NewReservation>,
) -> ApiResult<Reservation> {
    let today = Utc::now().date_naive();
    let reservation = state.db.reservations().create(&body, today).await?;
    Ok(ApiResponse::ok("Reservation created", reservation))
}

/// GET /api/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reservation> {
    let reservation = state
        .db
        .reservations()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation", &id))?;
    Ok(ApiResponse::ok("Reservation", reservation))
}

/// GET /api/reservations/{id}/detail - required vs assigned rooms.
pub async fn reservation_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ReservationDetail> {
    let detail = state.db.reservations().detail(&id).await?;
    Ok(ApiResponse::ok("Reservation detail", detail))
}

/// GET /api/reservations/{id}/rooms - assigned rooms with nightly rates.
pub async fn reservation_rooms(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<RoomRate>> {
    let rooms = state.db.reservations().rooms(&id).await?;
    Ok(ApiResponse::ok(format!("{} rooms assigned", rooms.len()), rooms))
}

/// PUT /api/reservations/{id}/stay - new dates and/or required room count.
pub async fn update_stay(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StayUpdate>,
) -> ApiResult<Reservation> {
    let reservation = state.db.reservations().update_stay(&id, &body).await?;
    Ok(ApiResponse::ok("Stay updated", reservation))
}

/// POST /api/reservations/{id}/confirmation - flips confirmed/unconfirmed.
pub async fn toggle_confirmation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BookingStatus> {
    let status = state.db.reservations().toggle_confirmation(&id).await?;
    let message = match status {
        BookingStatus::Confirmed => "Reservation confirmed",
        BookingStatus::Unconfirmed => "Reservation unconfirmed",
    };
    Ok(ApiResponse::ok(message, status))
}

/// POST /api/reservations/{id}/check-in
pub async fn check_in(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StayChange> {
    let stay_state = state.db.reservations().check_in(&id).await?;
    info!(reservation_id = %id, "check_in command");
    Ok(ApiResponse::ok(
        "Checked in",
        StayChange {
            reservation_id: id,
            stay_state,
        },
    ))
}

/// POST /api/reservations/{id}/check-out
pub async fn check_out(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StayChange> {
    let stay_state = state.db.reservations().check_out(&id).await?;
    info!(reservation_id = %id, "check_out command");
    Ok(ApiResponse::ok(
        "Checked out",
        StayChange {
            reservation_id: id,
            stay_state,
        },
    ))
}

/// DELETE /api/reservations/{id}
///
/// Succeeds even when the invoice could not be removed; the outcome's
/// `warnings` say why.
pub async fn delete_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteOutcome> {
    let outcome = state.db.reservations().delete(&id).await?;

    let message = if outcome.warnings.is_empty() {
        "Reservation deleted".to_string()
    } else {
        warn!(reservation_id = %id, warnings = ?outcome.warnings, "Reservation deleted with warnings");
        format!("Reservation deleted. {}", outcome.warnings.join(" "))
    };
    Ok(ApiResponse::ok(message, outcome))
}

/// PUT /api/reservations/{id}/primary-guest
pub async fn set_primary_guest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<GuestRef>,
) -> ApiResult<()> {
    state.db.reservations().set_primary_guest(&id, &body.guest_id).await?;
    Ok(ApiResponse::ok("Primary guest set", ()))
}

/// GET /api/reservations/{id}/companions
pub async fn list_companions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Guest>> {
    let guests = state.db.reservations().companions(&id).await?;
    Ok(ApiResponse::ok(format!("{} companions", guests.len()), guests))
}

/// POST /api/reservations/{id}/companions
pub async fn add_companion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<GuestRef>,
) -> ApiResult<()> {
    state.db.reservations().add_companion(&id, &body.guest_id).await?;
    Ok(ApiResponse::ok("Companion added", ()))
}

/// DELETE /api/reservations/{id}/companions/{guest_id}
pub async fn remove_companion(
    State(state): State<AppState>,
    Path((id, guest_id)): Path<(String, String)>,
) -> ApiResult<bool> {
    let removed = state.db.reservations().remove_companion(&id, &guest_id).await?;
    let message = if removed {
        "Companion removed"
    } else {
        "Guest was not a companion"
    };
    Ok(ApiResponse::ok(message, removed))
}
